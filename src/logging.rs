//! Tracing setup for the overlay.

use std::any::Any;

use tracing_subscriber::EnvFilter;

/// wgpu and naga are chatty at `info` during adapter and pipeline creation.
const DEFAULT_FILTER: &str = "skyline=info,wgpu_core=warn,wgpu_hal=warn,naga=warn,warn";

pub fn init_tracing() {
    // RUST_LOG=skyline=debug shows geometry rebuilds
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_target(false)
        .compact()
        .try_init();
}

/// Logs panics through `tracing`, tagged with the page the overlay was drawing
/// for.
pub fn install_panic_hook(page_path: &str) {
    let page_path = page_path.to_owned();
    std::panic::set_hook(Box::new(move |info| {
        let message = panic_message(info.payload());
        match info.location() {
            Some(location) => tracing::error!(
                page = %page_path,
                file = location.file(),
                line = location.line(),
                "skyline panicked: {message}"
            ),
            None => tracing::error!(page = %page_path, "skyline panicked: {message}"),
        }
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_reads_string_payloads() {
        let literal: Box<dyn Any + Send> = Box::new("surface lost");
        assert_eq!(panic_message(literal.as_ref()), "surface lost");

        let formatted: Box<dyn Any + Send> = Box::new(format!("building {} missing", 2));
        assert_eq!(panic_message(formatted.as_ref()), "building 2 missing");
    }

    #[test]
    fn test_panic_message_falls_back_for_other_payloads() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }
}
