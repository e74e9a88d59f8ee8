//! Tests for retry settings and `DefaultRetryPolicy`.

use super::*;

mod settings {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let settings = RetrySettings::default();

        assert_eq!(settings.initial_timeout, Duration::from_millis(2500));
        assert_eq!(settings.max_retries, 1);
        assert!((settings.backoff_multiplier - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn builder_chains_correctly() {
        let settings = RetrySettings::new()
            .with_initial_timeout(Duration::from_secs(1))
            .with_max_retries(4)
            .with_backoff_multiplier(0.5);

        assert_eq!(settings.initial_timeout, Duration::from_secs(1));
        assert_eq!(settings.max_retries, 4);
        assert!((settings.backoff_multiplier - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    #[should_panic(expected = "backoff multiplier must be a non-negative finite number")]
    fn negative_multiplier_panics() {
        let _ = RetrySettings::new().with_backoff_multiplier(-1.0);
    }

    #[test]
    #[should_panic(expected = "backoff multiplier must be a non-negative finite number")]
    fn infinite_multiplier_panics() {
        let _ = RetrySettings::new().with_backoff_multiplier(f64::INFINITY);
    }
}

mod default_policy {
    use super::*;

    #[test]
    fn starts_at_zero_retries_with_initial_timeout() {
        let policy = DefaultRetryPolicy::new();

        assert_eq!(policy.current_retry_count(), 0);
        assert_eq!(policy.current_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn retry_increments_count() {
        let policy = DefaultRetryPolicy::from_settings(RetrySettings::new().with_max_retries(3));

        policy.retry().unwrap();
        policy.retry().unwrap();

        assert_eq!(policy.current_retry_count(), 2);
    }

    #[test]
    fn retry_grows_timeout_by_multiplier() {
        let settings = RetrySettings::new()
            .with_initial_timeout(Duration::from_millis(1000))
            .with_max_retries(5)
            .with_backoff_multiplier(1.0);
        let policy = DefaultRetryPolicy::from_settings(settings);

        policy.retry().unwrap();
        assert_eq!(policy.current_timeout(), Duration::from_millis(2000));

        policy.retry().unwrap();
        assert_eq!(policy.current_timeout(), Duration::from_millis(4000));
    }

    #[test]
    fn zero_multiplier_keeps_timeout() {
        let settings = RetrySettings::new()
            .with_initial_timeout(Duration::from_millis(700))
            .with_max_retries(2)
            .with_backoff_multiplier(0.0);
        let policy = DefaultRetryPolicy::from_settings(settings);

        policy.retry().unwrap();

        assert_eq!(policy.current_timeout(), Duration::from_millis(700));
    }

    #[test]
    fn retry_fails_once_max_is_exceeded() {
        let policy = DefaultRetryPolicy::new();

        assert!(policy.retry().is_ok());
        assert_eq!(policy.retry(), Err(RetryError::Exhausted { retries: 2 }));
    }

    #[test]
    fn zero_max_retries_fails_first_retry() {
        let policy = DefaultRetryPolicy::from_settings(RetrySettings::new().with_max_retries(0));

        assert_eq!(policy.retry(), Err(RetryError::Exhausted { retries: 1 }));
    }

    #[test]
    fn policy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DefaultRetryPolicy>();
    }

    #[test]
    fn exhausted_error_displays_count() {
        let err = RetryError::Exhausted { retries: 3 };

        assert_eq!(err.to_string(), "retries exhausted after 3 retries");
    }
}
