use super::*;
use crate::model::device::DiscoverySource;
use crate::model::mac::Mac;
use crate::model::prefix::Prefix;
use std::str::FromStr;

fn device(addr: &str, mac: Mac) -> Device {
    Device::new(
        Addr::from_str(addr).unwrap(),
        mac,
        DiscoverySource::Arp,
        Timestamp::now(),
    )
}

fn network(cidr: &str) -> Network {
    Network::new(Prefix::from_str(cidr).unwrap())
}

mod network_store {
    use super::*;

    #[test]
    fn add_rejects_a_duplicate_prefix() {
        let store = MemoryNetworkStore::new();
        store.add(network("10.0.0.0/24")).unwrap();
        let err = store.add(network("10.0.0.0/24")).unwrap_err();
        assert!(matches!(err, MasonError::NetworkExists(_)));
    }

    #[test]
    fn upsert_never_errors_on_a_duplicate() {
        let store = MemoryNetworkStore::new();
        store.upsert(network("10.0.0.0/24")).unwrap();
        store.upsert(network("10.0.0.0/24")).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn list_filtered_applies_the_predicate() {
        let store = MemoryNetworkStore::new();
        store.add(network("10.0.0.0/24")).unwrap();
        store.add(network("10.0.1.0/24")).unwrap();
        let matches = store
            .list_filtered(&|n: &Network| n.key().starts_with("10.0.1"))
            .unwrap();
        assert_eq!(matches.len(), 1);
    }
}

mod device_store {
    use super::*;

    #[test]
    fn add_rejects_a_duplicate_addr() {
        let store = MemoryDeviceStore::new();
        store.add(device("10.0.0.5", Mac::Empty)).unwrap();
        let err = store.add(device("10.0.0.5", Mac::Empty)).unwrap_err();
        assert!(matches!(err, MasonError::DeviceExists(_)));
    }

    #[test]
    fn update_on_an_unknown_addr_inserts_it() {
        let store = MemoryDeviceStore::new();
        let enrich_requested = store.update(device("10.0.0.5", Mac::Empty)).unwrap();
        assert!(!enrich_requested);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn update_signals_enrichment_only_when_mac_becomes_known() {
        let store = MemoryDeviceStore::new();
        store.add(device("10.0.0.5", Mac::Empty)).unwrap();

        let still_unknown = store.update(device("10.0.0.5", Mac::Empty)).unwrap();
        assert!(!still_unknown);

        let newly_known = store
            .update(device("10.0.0.5", Mac::Known(pnet::util::MacAddr::broadcast())))
            .unwrap();
        assert!(newly_known);

        let known_again = store
            .update(device("10.0.0.5", Mac::Known(pnet::util::MacAddr::broadcast())))
            .unwrap();
        assert!(!known_again);
    }
}

mod timeseries_store {
    use super::*;

    #[test]
    fn read_returns_points_within_the_window_in_ascending_order() {
        let store = MemoryTimeseriesStore::new();
        let dev = device("10.0.0.5", Mac::Empty);
        let stats = IcmpStats {
            success_count: 1,
            packet_loss: 0.0,
            minimum: Duration::from_millis(1),
            mean: Duration::from_millis(2),
            maximum: Duration::from_millis(3),
            std_dev: Duration::ZERO,
            total_elapsed: Duration::from_millis(3),
            start: Timestamp::now(),
            peer: dev.identity.addr,
        };
        store.write_performance_ping(Timestamp::now(), &dev, &stats).unwrap();
        let points = store
            .read_performance_pings(&dev, Duration::from_secs(3600))
            .unwrap();
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn unknown_device_reads_as_empty() {
        let store = MemoryTimeseriesStore::new();
        let dev = device("10.0.0.9", Mac::Empty);
        assert!(store
            .read_performance_pings(&dev, Duration::from_secs(60))
            .unwrap()
            .is_empty());
    }
}

mod asn_store {
    use super::*;
    use crate::model::asn::IpRange;

    fn asn(number: &str, start: &str, end: &str, name: &str, country: &str) -> Asn {
        Asn {
            asn: number.to_string(),
            country: country.to_string(),
            name: name.to_string(),
            ip_range: IpRange {
                start: start.parse().unwrap(),
                end: end.parse().unwrap(),
            },
        }
    }

    #[test]
    fn get_asn_finds_a_matching_range() {
        let store = MemoryAsnStore::new();
        store
            .upsert_asn(asn("AS15169", "8.8.8.0", "8.8.8.255", "Google", "US"))
            .unwrap();
        let found = store.get_asn("8.8.8.8".parse().unwrap()).unwrap();
        assert_eq!(found.unwrap().name, "Google");
    }

    #[test]
    fn staged_rows_are_invisible_until_commit() {
        let store = MemoryAsnStore::new();
        store
            .upsert_asn(asn("AS1", "1.1.1.0", "1.1.1.255", "Old", "US"))
            .unwrap();

        let txn = store.start_asn_load().unwrap();
        store
            .upsert_asn(asn("AS2", "2.2.2.0", "2.2.2.255", "New", "CA"))
            .unwrap();

        // the old row is gone from the live table's perspective once a load
        // starts staging replacements, but isn't visible until commit
        assert!(store.get_asn("2.2.2.2".parse().unwrap()).unwrap().is_none());

        txn.commit().unwrap();
        assert!(store.get_asn("1.1.1.1".parse().unwrap()).unwrap().is_none());
        assert_eq!(
            store.get_asn("2.2.2.2".parse().unwrap()).unwrap().unwrap().name,
            "New"
        );
    }
}

mod netflow_store {
    use super::*;
    use crate::model::flow::TcpFlags;

    fn flow(src: &str, bytes: u64, packets: u64) -> IpFlow {
        IpFlow {
            src_addr: Addr::from_str(src).unwrap(),
            src_port: 54321,
            src_asn: None,
            dst_addr: Addr::from_str("8.8.8.8").unwrap(),
            dst_port: 53,
            dst_asn: None,
            start: Timestamp::now(),
            end: Timestamp::now(),
            bytes,
            packets,
            protocol: IpFlow::PROTO_UDP,
            tcp_flags: TcpFlags::default(),
        }
    }

    #[test]
    fn summary_by_ip_aggregates_across_batches() {
        let store = MemoryNetflowStore::new();
        store
            .add_netflows(vec![flow("192.168.1.10", 100, 1), flow("192.168.1.10", 40, 1)])
            .unwrap();
        let summary = store.summary_by_ip().unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].bytes, 140);
        assert_eq!(summary[0].packets, 2);
    }

    #[test]
    fn summary_by_org_drops_flows_with_no_asn_match() {
        let store = MemoryNetflowStore::new();
        let asns = MemoryAsnStore::new();
        store.add_netflows(vec![flow("192.168.1.10", 100, 1)]).unwrap();

        let unmatched = store.summary_by_org(&asns).unwrap();
        assert!(unmatched.is_empty());
    }
}
