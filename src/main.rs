//! youthy - Main CLI Entry Point

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use clap::Parser;
use colored::Colorize;
use futures_util::StreamExt;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use youthy::catalog::CatalogClient;
use youthy::cli::{Args, Commands, Verbosity};
use youthy::config::Config;
use youthy::context::Citation;
use youthy::engine::RetrievalEngine;
use youthy::generation::{GenerationRequest, OllamaGenerator, TextGenerator};
use youthy::hybrid::{EmbeddingClient, HybridRetriever};
use youthy::policy::{
    expiry, ApplyChannel, ApplyMethod, Benefit, Category, Eligibility, PolicyRecord,
    ALL_CATEGORIES, REGION_WIDE,
};
use youthy::store::{InMemoryStore, LocalStoreSearch};

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Seed records for the in-memory store and the hybrid corpus. The real
/// store is populated by an external ingestion job; these keep the CLI
/// usable without one.
fn demo_policies() -> Vec<PolicyRecord> {
    let next_month = (Utc::now().date_naive() + ChronoDuration::days(30))
        .format("%Y.%m.%d")
        .to_string();
    let window = format!("2024.01.01 ~ {next_month}");

    vec![
        demo_policy(
            "seoul_housing_monthly",
            "서울시 청년월세지원",
            "서울특별시",
            REGION_WIDE,
            vec![Category::Housing],
            "만 19~39세 무주택 청년에게 월세를 지원합니다",
            "서울시에 거주하는 만 19세~39세 무주택 청년에게 월 20만원의 월세를 최대 12개월간 지원합니다. 임차보증금 5천만원 이하, 월세 60만원 이하 주택에 거주해야 합니다.",
            Eligibility {
                age_min: Some(19),
                age_max: Some(39),
                ..Eligibility::default()
            },
            Benefit {
                amount: Some(200_000),
                description: Some("월 20만원, 최대 12개월".to_string()),
            },
            "상시모집",
        ),
        demo_policy(
            "seoul_allowance",
            "서울 청년수당",
            "서울특별시",
            REGION_WIDE,
            vec![Category::Employment, Category::Welfare],
            "미취업 청년의 구직활동을 지원하는 수당입니다",
            "서울시 거주 만 19세~34세 미취업 청년에게 월 50만원의 구직활동 지원금을 최대 6개월간 지급합니다. 졸업 후 2년 이내 미취업자가 대상입니다.",
            Eligibility {
                age_min: Some(19),
                age_max: Some(34),
                ..Eligibility::default()
            },
            Benefit {
                amount: Some(500_000),
                description: Some("월 50만원, 최대 6개월".to_string()),
            },
            &window,
        ),
        demo_policy(
            "seongbuk_startup_fund",
            "성북구 청년 창업지원금",
            "성북구청",
            "성북구",
            vec![Category::Startup],
            "성북구 청년 예비창업자에게 초기 사업비를 지원합니다",
            "성북구에 주민등록을 둔 만 19세~39세 예비창업자 또는 3년 이내 창업기업 대표에게 사업화 자금 최대 1천만원을 지원합니다.",
            Eligibility {
                age_min: Some(19),
                age_max: Some(39),
                ..Eligibility::default()
            },
            Benefit {
                amount: Some(10_000_000),
                description: Some("사업화 자금 최대 1천만원".to_string()),
            },
            &window,
        ),
        demo_policy(
            "seoul_tuition_interest",
            "대학생 학자금대출 이자지원",
            "서울특별시",
            REGION_WIDE,
            vec![Category::Education],
            "대학생 학자금대출 이자를 서울시가 대신 부담합니다",
            "서울시 거주 대학생 및 대학원생이 한국장학재단에서 받은 학자금대출의 이자를 지원합니다. 소득분위 제한 없이 신청 가능합니다.",
            Eligibility {
                student: Some(true),
                ..Eligibility::default()
            },
            Benefit {
                amount: None,
                description: Some("학자금대출 이자 전액".to_string()),
            },
            "상시모집",
        ),
        demo_policy(
            "gangnam_job_school",
            "강남구 청년취업사관학교",
            "강남구청",
            "강남구",
            vec![Category::Employment, Category::Education],
            "취업준비 청년을 위한 직무교육 프로그램입니다",
            "강남구 거주 만 19세~39세 취업준비 청년에게 IT 직무교육과 취업 연계를 무료로 제공합니다. 교육 수료 시 수료증과 기업 추천서를 발급합니다.",
            Eligibility {
                age_min: Some(19),
                age_max: Some(39),
                ..Eligibility::default()
            },
            Benefit {
                amount: None,
                description: Some("직무교육 무료 수강".to_string()),
            },
            "상시모집",
        ),
        demo_policy(
            "seoul_culture_pass",
            "서울 청년문화패스",
            "서울특별시",
            REGION_WIDE,
            vec![Category::Culture],
            "공연과 전시 관람비를 지원하는 문화바우처입니다",
            "서울시 거주 만 19세~22세 청년에게 연간 20만원의 공연·전시 관람 바우처를 지급합니다. 중위소득 150% 이하 가구가 대상입니다.",
            Eligibility {
                age_min: Some(19),
                age_max: Some(22),
                income_condition: Some("중위소득 150% 이하".to_string()),
                ..Eligibility::default()
            },
            Benefit {
                amount: Some(200_000),
                description: Some("연간 20만원 문화바우처".to_string()),
            },
            &window,
        ),
    ]
}

fn demo_policy(
    id: &str,
    title: &str,
    agency: &str,
    region: &str,
    categories: Vec<Category>,
    summary: &str,
    body: &str,
    eligibility: Eligibility,
    benefit: Benefit,
    application_period_text: &str,
) -> PolicyRecord {
    let expiry = expiry::classify_today(application_period_text, None);

    PolicyRecord {
        id: id.to_string(),
        title: title.to_string(),
        agency: agency.to_string(),
        region: region.to_string(),
        categories,
        summary: summary.to_string(),
        body: body.to_string(),
        eligibility,
        benefit,
        apply_method: ApplyMethod {
            method: ApplyChannel::Online,
            url: Some("https://youth.seoul.go.kr".to_string()),
        },
        application_period_text: application_period_text.to_string(),
        period_start: expiry.period.start(),
        period_end: expiry.period.end(),
        status: expiry.status,
        source_name: "서울청년포털".to_string(),
        source_url: "https://youth.seoul.go.kr".to_string(),
        updated_at: Utc::now(),
    }
}

/// Answer one question end to end: retrieve, assemble, generate.
async fn run_query(args: &Args, question: &str) -> Result<()> {
    let config = load_config(args)?;
    let user = args.user_context();

    let records = demo_policies();
    let store = InMemoryStore::new();
    store.insert_records(&records).await;
    let local = LocalStoreSearch::new(Arc::new(store));

    let catalog = CatalogClient::with_config(
        config.catalog.base_url.clone(),
        config.catalog.api_key.clone(),
        config.catalog.request_delay_ms,
    );

    let embeddings = EmbeddingClient::with_config(
        config.embedding.base_url.clone(),
        config.embedding.model.clone(),
    );
    let embeddings = if embeddings.is_available().await {
        Some(embeddings)
    } else {
        warn!("embedding service unreachable, hybrid retrieval degrades to keyword-only");
        None
    };

    let hybrid = HybridRetriever::build(records, embeddings)
        .await
        .with_weights(
            config.retrieval.keyword_weight,
            config.retrieval.semantic_weight,
        );

    let engine = RetrievalEngine::with_config(
        local,
        Arc::new(catalog),
        hybrid,
        config.retrieval.engine_config(),
    );

    let answer = engine.answer_query(question, &user).await;

    if !args.quiet && !answer.categories_detected.is_empty() {
        let labels: Vec<&str> = answer
            .categories_detected
            .iter()
            .map(|category| category.label())
            .collect();
        println!("{} {}\n", "분야:".bold(), labels.join(", ").cyan());
    }

    if args.no_generate {
        println!("{}", answer.context_text);
        print_citations(&answer.citations);
        return Ok(());
    }

    let generator = OllamaGenerator::with_config(&config.generation.base_url, &config.generation.model);

    if !generator.health_check().await {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "generation service unreachable, printing retrieved context instead"
        );
        println!("{}", answer.context_text);
        print_citations(&answer.citations);
        return Ok(());
    }

    let request = GenerationRequest::new(question, &answer.context_text, &user);
    let mut stream = generator.generate_stream(&request).await?;

    while let Some(token) = stream.next().await {
        match token {
            Ok(text) => {
                print!("{text}");
                std::io::stdout().flush()?;
            }
            Err(err) => {
                eprintln!("\n{} {}", "error:".red().bold(), err);
                break;
            }
        }
    }
    println!();

    print_citations(&answer.citations);
    Ok(())
}

fn print_citations(citations: &[Citation]) {
    if citations.is_empty() {
        return;
    }

    println!("\n{}", "참고 정책".bold());
    for (index, citation) in citations.iter().enumerate() {
        println!(
            "  [{}] {} · {}",
            index + 1,
            citation.title,
            citation.source.dimmed()
        );
        if citation.url != "#" {
            println!("      {}", citation.url.dimmed());
        }
    }
}

enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

struct HealthCheck {
    name: &'static str,
    status: HealthStatus,
}

/// Run service health checks and exit non-zero if anything failed.
async fn run_doctor(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let mut checks = Vec::new();

    let config_path = Config::config_path()?;
    checks.push(HealthCheck {
        name: "Config file",
        status: if config_path.exists() {
            HealthStatus::Pass
        } else {
            HealthStatus::Warn("not found, defaults in use".to_string())
        },
    });

    checks.push(HealthCheck {
        name: "Catalog API key",
        status: if config.catalog.api_key.is_empty() {
            HealthStatus::Warn("not set, catalog requests will return zero results".to_string())
        } else {
            HealthStatus::Pass
        },
    });

    let catalog = CatalogClient::with_config(
        config.catalog.base_url.clone(),
        config.catalog.api_key.clone(),
        config.catalog.request_delay_ms,
    );
    checks.push(HealthCheck {
        name: "Catalog service",
        status: if catalog.health_check().await {
            HealthStatus::Pass
        } else {
            HealthStatus::Fail("youth-policy catalog unreachable".to_string())
        },
    });

    let generator = OllamaGenerator::with_config(&config.generation.base_url, &config.generation.model);
    checks.push(HealthCheck {
        name: "Generation service",
        status: if generator.health_check().await {
            HealthStatus::Pass
        } else {
            HealthStatus::Fail("Ollama not running or not reachable".to_string())
        },
    });

    let embeddings = EmbeddingClient::with_config(
        config.embedding.base_url.clone(),
        config.embedding.model.clone(),
    );
    checks.push(HealthCheck {
        name: "Embedding service",
        status: if embeddings.is_available().await {
            HealthStatus::Pass
        } else {
            HealthStatus::Warn("unreachable, hybrid retrieval degrades to keyword-only".to_string())
        },
    });

    println!("\n{}\n", "youthy system diagnostics".bold());
    println!("{:<20} Status", "Check");
    println!("{}", "=".repeat(60));

    let mut healthy = true;
    for check in &checks {
        match &check.status {
            HealthStatus::Pass => println!("{:<20} {}", check.name, "PASS".green()),
            HealthStatus::Warn(message) => {
                println!("{:<20} {} {}", check.name, "WARN".yellow(), message)
            }
            HealthStatus::Fail(message) => {
                healthy = false;
                println!("{:<20} {} {}", check.name, "FAIL".red(), message)
            }
        }
    }
    println!();

    std::process::exit(if healthy { 0 } else { 1 });
}

fn list_categories() {
    println!("\n{}\n", "정책 분야".bold());
    for category in ALL_CATEGORIES {
        println!(
            "  {:<10} {}",
            category.label().bold(),
            category.keywords().join(", ").dimmed()
        );
    }
    println!();
}

fn show_config(config: &Config) -> Result<()> {
    println!("Config file: {}", Config::config_path()?.display());
    println!();

    println!("Catalog:");
    println!("  Base URL:    {}", config.catalog.base_url);
    println!(
        "  API key:     {}",
        if config.catalog.api_key.is_empty() {
            "(not set)"
        } else {
            "(set)"
        }
    );
    println!("  Req. delay:  {} ms", config.catalog.request_delay_ms);
    println!();

    println!("Generation:");
    println!("  Base URL:  {}", config.generation.base_url);
    println!("  Model:     {}", config.generation.model);
    println!();

    println!("Embedding:");
    println!("  Base URL:  {}", config.embedding.base_url);
    println!("  Model:     {}", config.embedding.model);
    println!();

    println!("Retrieval:");
    println!("  Local limit:      {}", config.retrieval.local_limit);
    println!("  Local sufficient: {}", config.retrieval.local_sufficient);
    println!("  External limit:   {}", config.retrieval.external_limit);
    println!("  Hybrid top-k:     {}", config.retrieval.hybrid_top_k);
    println!("  Result cap:       {}", config.retrieval.result_cap);
    println!(
        "  Fan-out timeout:  {} s",
        config.retrieval.fanout_timeout_secs
    );
    println!(
        "  Weights:          keyword {} / semantic {}",
        config.retrieval.keyword_weight, config.retrieval.semantic_weight
    );
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(message) = args.validate() {
        eprintln!("{} {}", "error:".red().bold(), message);
        std::process::exit(2);
    }

    init_tracing(args.verbosity());

    match &args.command {
        Some(Commands::Doctor) => {
            run_doctor(&args).await?;
        }
        Some(Commands::Categories) => {
            list_categories();
        }
        Some(Commands::Config) => {
            let config = load_config(&args)?;
            show_config(&config)?;
        }
        None => {
            if let Some(question) = args.question.clone() {
                run_query(&args, &question).await?;
            }
        }
    }

    Ok(())
}
