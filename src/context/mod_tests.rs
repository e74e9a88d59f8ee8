use super::*;

fn identity() -> DeviceIdentity {
    DeviceIdentity::new("4.2.0")
        .with_device("Acme", "Phone 7")
        .with_os_version("14")
}

mod ambient_headers {
    use super::*;

    #[test]
    fn test_full_header_set_in_order() {
        let identity = identity().with_carrier("Telco");
        let context = AmbientContext::new(identity, Some("LTE".into()), true);

        assert_eq!(
            context.ambient_headers(2),
            vec![
                (header::APP_VERSION, "4.2.0".to_string()),
                (header::MANUFACTURER, "Acme".to_string()),
                (header::DEVICE_MODEL, "Phone 7".to_string()),
                (header::OS_VERSION, "14".to_string()),
                (header::CONNECTION_TYPE, "LTE".to_string()),
                (header::CARRIER, "Telco".to_string()),
                (header::RETRIES, "2".to_string()),
                (header::TEST, "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_values_are_omitted() {
        let context = AmbientContext::new(identity(), None, false);
        let names: Vec<_> = context
            .ambient_headers(0)
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        assert!(!names.contains(&header::CONNECTION_TYPE));
        assert!(!names.contains(&header::CARRIER));
        assert!(!names.contains(&header::TEST));
        assert!(names.contains(&header::RETRIES));
    }

    #[test]
    fn test_retry_count_is_rendered_in_decimal() {
        let context = AmbientContext::new(identity(), None, false);
        let retries = context
            .ambient_headers(12)
            .into_iter()
            .find(|(name, _)| *name == header::RETRIES)
            .map(|(_, value)| value);

        assert_eq!(retries.as_deref(), Some("12"));
    }
}

mod connection_updates {
    use super::*;

    #[test]
    fn test_update_replaces_label() {
        let context = AmbientContext::new(identity(), Some("WIFI".into()), false);

        context.update_connection_type(Some("EDGE".into()));
        assert_eq!(context.connection_type().as_deref(), Some("EDGE"));

        context.update_connection_type(None);
        assert_eq!(context.connection_type(), None);
    }

    #[test]
    fn test_subscribers_see_updates() {
        let context = AmbientContext::new(identity(), None, false);
        let mut receiver = context.subscribe();

        context.update_connection_type(Some("HSPA".into()));

        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().as_deref(), Some("HSPA"));
    }

    #[test]
    fn test_probe_sets_initial_and_refreshed_label() {
        let probe = FixedProbe(Some(ConnectionType::Wifi));
        let context = AmbientContext::from_probe(identity(), &probe, false);
        assert_eq!(context.connection_type().as_deref(), Some("WIFI"));

        let probe = FixedProbe(Some(ConnectionType::Mobile(MobileNetwork::Lte)));
        context.refresh_connection_type(&probe);
        assert_eq!(context.connection_type().as_deref(), Some("LTE"));

        context.refresh_connection_type(&FixedProbe(None));
        assert_eq!(context.connection_type(), None);
    }

    #[test]
    fn test_concurrent_readers_see_whole_labels() {
        let context = std::sync::Arc::new(AmbientContext::new(
            identity(),
            Some("WIFI".into()),
            false,
        ));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let context = std::sync::Arc::clone(&context);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let label = context.connection_type();
                        assert!(matches!(label.as_deref(), Some("WIFI" | "UMTS")));
                    }
                })
            })
            .collect();

        for i in 0..200 {
            let label = if i % 2 == 0 { "UMTS" } else { "WIFI" };
            context.update_connection_type(Some(label.into()));
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}

mod connection_type {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ConnectionType::Wifi.label(), "WIFI");
        assert_eq!(ConnectionType::Mobile(MobileNetwork::OneXRtt).label(), "1xRTT");
        assert_eq!(ConnectionType::Mobile(MobileNetwork::EvdoRevA).label(), "EVDO_A");
        assert_eq!(ConnectionType::Mobile(MobileNetwork::Unknown).to_string(), "UNKNOWN");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("wifi".parse::<ConnectionType>().unwrap(), ConnectionType::Wifi);
        assert_eq!(
            " lte ".parse::<ConnectionType>().unwrap(),
            ConnectionType::Mobile(MobileNetwork::Lte)
        );
        assert_eq!(
            "1XRTT".parse::<ConnectionType>().unwrap(),
            ConnectionType::Mobile(MobileNetwork::OneXRtt)
        );
    }

    #[test]
    fn test_every_label_round_trips() {
        for network in MobileNetwork::ALL {
            let connection = ConnectionType::Mobile(network);
            assert_eq!(connection.label().parse::<ConnectionType>().unwrap(), connection);
        }
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let err = "ethernet".parse::<ConnectionType>().unwrap_err();
        assert_eq!(err, UnknownConnectionType("ethernet".into()));
        assert_eq!(err.to_string(), "unknown connection type 'ethernet'");
    }
}
