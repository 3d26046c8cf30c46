//! Market ETL batch collector CLI.

use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use etl_collector::modules::{
    self, BackfillOptions, IndicatorCollectOptions, IndicatorMode, IndicatorPlan,
    PriceCollectOptions, PriceMode, WindowPlan,
};
use etl_collector::CollectorConfig;
use etl_core::{market_today, LogConfig};

#[derive(Parser)]
#[command(name = "etl-collector")]
#[command(about = "B3 equity and BCB indicator batch ETL", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error). `RUST_LOG`가 우선
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 종목 일봉 수집 (Yahoo Finance → raw.stocks)
    Prices {
        #[arg(long, value_enum, default_value = "incremental")]
        mode: PriceMode,

        /// 특정 종목만 수집 (예: "PETR4" 또는 "PETR4.SA")
        #[arg(long)]
        symbol: Option<String>,

        /// 시작일 (YYYY-MM-DD, historical 모드)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// 종료일 (YYYY-MM-DD, historical 모드, 미포함)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// 증분 조회 일수 (incremental 모드)
        #[arg(long)]
        lookback_days: Option<u32>,

        /// 실행 계획만 출력
        #[arg(long)]
        dry_run: bool,
    },

    /// 거시 지표 수집 (BCB SGS → raw.indicators)
    Indicators {
        #[arg(long, value_enum, default_value = "incremental")]
        mode: IndicatorMode,

        /// 특정 지표만 수집 (예: "433")
        #[arg(long)]
        indicator: Option<String>,

        /// 배치 크기 (년, full-historical 모드)
        #[arg(long)]
        batch_size: Option<u32>,

        /// 시작일 (YYYY-MM-DD, historical 모드)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// 종료일 (YYYY-MM-DD, historical 모드)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// 증분 조회 일수 (incremental 모드)
        #[arg(long)]
        lookback_days: Option<u32>,

        /// 추출만 하고 적재하지 않음
        #[arg(long)]
        no_load: bool,

        /// 배치 계획만 출력
        #[arg(long)]
        dry_run: bool,
    },

    /// 주가/지표 통합 백필
    Backfill {
        /// 시작일 (YYYY-MM-DD)
        #[arg(long, default_value = "2015-01-01")]
        start: NaiveDate,

        /// 종료일 (YYYY-MM-DD, 기본값: 오늘)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// 주가만 백필
        #[arg(long, conflicts_with = "indicators_only")]
        prices_only: bool,

        /// 지표만 백필
        #[arg(long)]
        indicators_only: bool,
    },

    /// 적재 데이터 품질 리포트
    Validate {
        /// 최근 N시간 내 적재 행이 없으면 실패
        #[arg(long)]
        fresh_hours: Option<u32>,
    },

    /// raw 스키마 생성
    InitDb,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 로깅 초기화
    let log_config = LogConfig::from_env(&cli.log_level);
    if let Err(e) = etl_core::init_logging(&log_config) {
        eprintln!("로깅 초기화 실패: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Market ETL Collector 시작");

    if let Err(e) = run(cli.command).await {
        tracing::error!(error = %e, "실행 실패");
        std::process::exit(1);
    }

    tracing::info!("Market ETL Collector 종료");
}

async fn run(command: Commands) -> etl_collector::Result<()> {
    // 설정 로드
    let config = CollectorConfig::from_env()?;
    let extraction = config.load_extraction()?;
    tracing::debug!(
        tickers = extraction.stock_tickers.len(),
        indicators = extraction.indicators.len(),
        "설정 로드 완료"
    );

    match command {
        Commands::Prices {
            mode,
            symbol,
            start,
            end,
            lookback_days,
            dry_run,
        } => {
            let scoped = modules::scoped_price_config(&extraction, symbol.as_deref());

            if dry_run {
                let today = market_today();
                let tickers = scoped.stock_tickers.clone();
                let plan = match mode {
                    PriceMode::Incremental => {
                        WindowPlan::incremental("prices", &scoped, tickers, lookback_days, today)
                    }
                    PriceMode::Historical => {
                        WindowPlan::historical("prices", &scoped, tickers, start, end, today)
                    }
                };
                println!("{}", plan.render());
                return Ok(());
            }

            let pool = config.connect().await?;
            tracing::info!("데이터베이스 연결 성공");

            let options = PriceCollectOptions {
                mode,
                start,
                end,
                lookback_days,
            };
            let stats = modules::collect_prices(&pool, scoped, &options).await?;
            stats.log_summary("주가 수집");
            pool.close().await;
        }
        Commands::Indicators {
            mode,
            indicator,
            batch_size,
            start,
            end,
            lookback_days,
            no_load,
            dry_run,
        } => {
            let scoped = modules::scoped_indicator_config(&extraction, indicator.as_deref())?;

            if dry_run {
                let today = market_today();
                let rendered = match mode {
                    IndicatorMode::FullHistorical => IndicatorPlan::build(
                        &scoped,
                        batch_size.unwrap_or(scoped.batch_size_years),
                        today,
                    )?
                    .render(),
                    IndicatorMode::Incremental | IndicatorMode::Historical => {
                        let codes = scoped.indicators.iter().map(|i| i.code.clone()).collect();
                        let plan = if mode == IndicatorMode::Incremental {
                            WindowPlan::incremental(
                                "indicators",
                                &scoped,
                                codes,
                                lookback_days,
                                today,
                            )
                        } else {
                            WindowPlan::historical(
                                "indicators",
                                &scoped,
                                codes,
                                start,
                                end,
                                today,
                            )
                        };
                        plan.render()
                    }
                };
                println!("{}", rendered);
                return Ok(());
            }

            let pool = if no_load {
                None
            } else {
                let pool = config.connect().await?;
                tracing::info!("데이터베이스 연결 성공");
                Some(pool)
            };

            let options = IndicatorCollectOptions {
                mode,
                indicator,
                batch_size_years: batch_size,
                start,
                end,
                lookback_days,
            };
            let stats = modules::collect_indicators(pool.as_ref(), scoped, &options).await?;
            stats.log_summary("지표 수집");

            if let Some(pool) = pool {
                pool.close().await;
            }
        }
        Commands::Backfill {
            start,
            end,
            prices_only,
            indicators_only,
        } => {
            let pool = config.connect().await?;
            tracing::info!("데이터베이스 연결 성공");

            let options = BackfillOptions {
                start,
                end,
                prices: !indicators_only,
                indicators: !prices_only,
            };
            let report = modules::run_backfill(&pool, Arc::new(extraction), &options).await?;
            if let Some(rows) = report.usd_brl_fallback_rows {
                tracing::info!(rows = rows, "USD/BRL 대체 적재");
            }
            pool.close().await;
        }
        Commands::Validate { fresh_hours } => {
            let pool = config.connect().await?;
            let report = modules::quality_report(&pool, fresh_hours).await?;
            pool.close().await;

            println!("{}", report.render());
            report.ensure_passed()?;
        }
        Commands::InitDb => {
            let pool = config.connect().await?;
            etl_data::ensure_raw_schema(&pool).await?;
            tracing::info!("raw 스키마 준비 완료");
            pool.close().await;
        }
    }

    Ok(())
}
