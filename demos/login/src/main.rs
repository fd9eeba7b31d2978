//! # Login Demo
//!
//! One component listens for successful logins, another triggers a login.
//! Neither knows about the other; both only name the `Login` event type.

use anyhow::Result;
use async_trait::async_trait;
use observable_event::{event_type, EventDispatcher, ObservableEvent};
use tracing::info;

// ============================================================================
// Event
// ============================================================================

#[derive(Debug, Clone)]
struct Login {
    username: String,
    pwd: String,
}

#[async_trait]
impl ObservableEvent for Login {
    const EVENT_TYPE: &'static str = event_type!(Login);
    type Output = String;

    async fn processing(&self) -> Result<String> {
        Ok("success".to_string())
    }
}

// ============================================================================
// Listener (e.g. a home screen)
// ============================================================================

fn observe_logins(dispatcher: &EventDispatcher) -> tokio::task::JoinHandle<()> {
    let mut logins = Login::success(dispatcher).subscribe();
    tokio::spawn(async move {
        if let Some(login) = logins.recv().await {
            info!(
                username = %login.event.username,
                pwd = %login.event.pwd,
                output = %login.output,
                "home screen saw login"
            );
        }
    })
}

// ============================================================================
// Trigger (e.g. a login form)
// ============================================================================

async fn submit_login(dispatcher: &EventDispatcher) -> Result<()> {
    let output = Login {
        username: "user".to_string(),
        pwd: "pwd".to_string(),
    }
    .run(dispatcher)
    .await?;

    info!(%output, "login form got result");
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let dispatcher = EventDispatcher::new();

    let listener = observe_logins(&dispatcher);
    submit_login(&dispatcher).await?;

    listener.await?;
    dispatcher.wait_idle().await;

    Ok(())
}
