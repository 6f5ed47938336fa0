use anyhow::Result;
use axum::Router;
use clap::Parser;
use scoring::{Bm25Params, Pl2Params, ScoringConfig};
use server::build_app;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file or directory of JSON/JSONL documents
    #[arg(long, default_value = "./data")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// BM25 term-frequency saturation
    #[arg(long, default_value_t = 1.2)]
    bm25_k1: f64,
    /// BM25 length normalization
    #[arg(long, default_value_t = 0.75)]
    bm25_b: f64,
    /// PL2 normalization hyper-parameter
    #[arg(long, default_value_t = 1.0, value_parser = positive_f64)]
    pl2_c: f64,
}

fn positive_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("expected a positive number, got {s}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let scoring = ScoringConfig {
        bm25: Bm25Params { k1: args.bm25_k1, b: args.bm25_b, field_b: HashMap::new() },
        pl2: Pl2Params { c: args.pl2_c },
    };
    let app: Router = build_app(&args.corpus, &scoring)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, corpus = %args.corpus, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
