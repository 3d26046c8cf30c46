//! 웨어하우스 저장소.
//!
//! - `loader`: 스테이징 후 자연 키 충돌 무시 병합 (멱등 적재)
//! - `tables`: `raw.stocks`, `raw.indicators` 테이블 정의
//! - `validator`: 적재 후 읽기 전용 집계
//! - `schema`: raw 스키마 DDL

pub mod loader;
pub mod schema;
pub mod tables;
pub mod validator;

pub use loader::{Loadable, Loader, TableSpec};
pub use tables::{INDICATORS_TABLE, STOCKS_TABLE};
pub use validator::Validator;
