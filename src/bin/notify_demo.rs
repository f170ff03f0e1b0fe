//! Demo that sends a sample job list and a blocked-source notice through the configured channel
//! (log only when Telegram is not configured).

use chrono::Local;
use job_hunt::config::HttpConfig;
use job_hunt::engine::format_job_list;
use job_hunt::ingest::blocked_message;
use job_hunt::notify::channel_from_env;
use job_hunt::JobPosting;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();
    let channel = channel_from_env(&HttpConfig::default());
    let notifier = channel.as_notifier();

    let jobs = vec![
        JobPosting {
            title: "Staff Product Manager".into(),
            company: "Shopify".into(),
            location: "Toronto, Canada".into(),
            link: "https://example.com/job1".into(),
            posted_date: Local::now().date_naive().to_string(),
        },
        JobPosting {
            title: "Principal Product Manager".into(),
            company: "Google".into(),
            location: "Zurich, Switzerland".into(),
            link: "https://example.com/job2".into(),
            posted_date: Local::now().date_naive().to_string(),
        },
    ];

    let messages = [
        format_job_list(&jobs, Local::now().date_naive()),
        blocked_message("Indeed"),
    ];
    for text in &messages {
        if let Err(e) = notifier.send_message(text).await {
            tracing::warn!(error = ?e, "demo send failed");
        }
        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    }

    println!("notify-demo done");
}
