//! Tests for diagnostic log setup

#[cfg(test)]
mod tests {
    use outpainter::io::logging::init_logging;

    // Tests repeated initialisation leaves the first subscriber in place
    // Verified by panicking on a second global subscriber
    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false);
        assert!(!init_logging(true));
        tracing::debug!("still routed to the first subscriber");
    }
}
