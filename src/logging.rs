use std::io;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub fn configure_logging() {
    // Stdout log configuration
    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(EnvFilter::new("info,llm_request=info,web_request=info"));

    // File log configuration
    let file_appender = tracing_appender::rolling::daily("logs", "quill.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_filter(EnvFilter::new("llm_request=debug,web_request=debug,info"));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}
