use crate::error::NasError;
use std::net::{IpAddr, Ipv4Addr};

/// The local IPv4 /24 the probes sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubnetContext {
    local: Ipv4Addr,
}

impl SubnetContext {
    /// Context for the /24 containing `local`
    #[must_use]
    pub fn new(local: Ipv4Addr) -> Self {
        Self { local }
    }

    /// Find the address of the interface carrying the default route
    ///
    /// # Errors
    ///
    /// Returns `NasError::NoLocalNetwork` if there is no IPv4 interface to
    /// probe from.
    pub fn detect() -> Result<Self, NasError> {
        match local_ip_address::local_ip() {
            Ok(IpAddr::V4(local)) if !local.is_loopback() && !local.is_unspecified() => {
                Ok(Self::new(local))
            }
            Ok(other) => Err(NasError::NoLocalNetwork {
                message: format!("no IPv4 interface, found {other}"),
            }),
            Err(e) => Err(NasError::NoLocalNetwork {
                message: e.to_string(),
            }),
        }
    }

    /// Our own address on the subnet
    #[must_use]
    pub fn local(&self) -> Ipv4Addr {
        self.local
    }

    /// Directed broadcast address of the /24
    #[must_use]
    pub fn broadcast(&self) -> Ipv4Addr {
        let [a, b, c, _] = self.local.octets();
        Ipv4Addr::new(a, b, c, 255)
    }

    /// Every host address in the /24 except our own
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let [a, b, c, own] = self.local.octets();
        (1..=254u8)
            .filter(move |d| *d != own)
            .map(move |d| Ipv4Addr::new(a, b, c, d))
    }

    /// Whether `addr` lies inside this /24
    #[must_use]
    pub fn contains(&self, addr: IpAddr) -> bool {
        match addr {
            IpAddr::V4(v4) => v4.octets()[..3] == self.local.octets()[..3],
            IpAddr::V6(_) => false,
        }
    }
}

/// Private-range addresses a home NAS can live on
///
/// IPv4 10/8, 172.16/12 and 192.168/16; IPv6 fec0::/10.
#[must_use]
pub fn is_site_local(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(v6) => v6.segments()[0] & 0xffc0 == 0xfec0,
    }
}
