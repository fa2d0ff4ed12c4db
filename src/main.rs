/*
 * Responsibility
 * - blood wave API の entry point
 * - tokio runtime 起動と app::run() の呼び出しのみ (起動失敗はログに残してから終了)
 */
mod api;
mod app;
mod config;
mod error;
mod middleware;
mod repos;
mod services;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await.inspect_err(|e| {
        tracing::error!(error = ?e, "blood wave api stopped");
    })
}
