mod common;

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt;
use smbscout::discovery::{MulticastHook, MulticastLock, Probe};
use smbscout::net::SubnetContext;
use smbscout::testing::{StallingProbe, StaticProbe, test_device};
use smbscout::{DiscoveryConfig, DiscoveryCoordinator, DiscoveryOutcome};

#[tokio::test]
#[ignore] // Run manually with `cargo test -- --ignored`
async fn test_discover_real_devices() {
    common::init_logging();

    let devices = smbscout::scan_network().await;

    println!("Found {} devices:", devices.len());
    for device in &devices {
        println!("  - {} ({})", device.label(), device.address);
        println!("    Source: {}", device.source);
        println!("    Reachable: {}", device.reachable);
    }
}

struct FlagHook(Arc<AtomicBool>);

impl MulticastHook for FlagHook {
    fn enable(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_lifecycle_with_platform_hook() {
    common::init_logging();

    let flag = Arc::new(AtomicBool::new(false));
    let lock = MulticastLock::with_hook(FlagHook(Arc::clone(&flag)));
    let probes: Vec<Arc<dyn Probe>> = vec![
        Arc::new(StaticProbe::new("mdns-like", vec![test_device(20, Some("DiskStation"))])),
        Arc::new(
            StaticProbe::new("netbios-like", vec![test_device(20, Some("DISKSTATION"))])
                .with_delay(Duration::from_millis(100)),
        ),
        Arc::new(StallingProbe::after(vec![test_device(21, None).reachable()])),
    ];
    let coordinator = DiscoveryCoordinator::with_probes(DiscoveryConfig::default(), probes)
        .with_subnet(SubnetContext::new(Ipv4Addr::new(192, 168, 1, 2)))
        .with_multicast_lock(lock.clone());

    let mut stream = coordinator.discover();
    assert!(flag.load(Ordering::SeqCst));

    let mut labels = Vec::new();
    while let Some(device) = stream.next().await {
        labels.push(device.label());
    }

    // The first sighting of .20 carries the mDNS-style name
    labels.sort();
    assert_eq!(labels, vec!["192.168.1.21".to_string(), "DiskStation".to_string()]);
    assert_eq!(stream.outcome(), Some(DiscoveryOutcome::DeadlineReached));
    assert!(!lock.is_held());
    assert!(!flag.load(Ordering::SeqCst));
}
