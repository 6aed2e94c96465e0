use ipnetwork::IpNetwork;
use std::net::IpAddr;
use std::sync::Arc;

use crate::DomainError;

/// A named client network, e.g. `lan` → `10.0.0.0/24`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub name: Arc<str>,
    pub cidr: IpNetwork,
}

impl Network {
    pub fn new(name: impl Into<Arc<str>>, cidr: IpNetwork) -> Self {
        Self {
            name: name.into(),
            cidr,
        }
    }

    pub fn parse(name: &str, cidr: &str) -> Result<Self, DomainError> {
        Self::validate_cidr(cidr).map_err(DomainError::InvalidCidr)?;

        let network: IpNetwork = cidr
            .trim()
            .parse()
            .map_err(|e| DomainError::InvalidCidr(format!("{} ({}): {}", cidr, name, e)))?;

        Ok(Self::new(name, network))
    }

    pub fn validate_cidr(cidr: &str) -> Result<(), String> {
        if cidr.trim().is_empty() {
            return Err("CIDR cannot be empty".to_string());
        }

        if !cidr.contains('/') {
            return Err(format!(
                "CIDR must include prefix (e.g., 192.168.1.0/24), got {}",
                cidr
            ));
        }

        Ok(())
    }

    pub fn prefix(&self) -> u8 {
        self.cidr.prefix()
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.cidr.contains(ip)
    }
}

/// Maps client addresses to the most specific declared network.
///
/// Networks are kept sorted by descending prefix length, so the first range
/// containing an address is also the narrowest one. The sort is stable: two
/// ranges with the same prefix keep their declaration order.
#[derive(Debug, Clone, Default)]
pub struct NetworkClassifier {
    networks: Vec<Network>,
}

impl NetworkClassifier {
    pub fn new(mut networks: Vec<Network>) -> Self {
        networks.sort_by(|a, b| b.prefix().cmp(&a.prefix()));
        Self { networks }
    }

    /// Parse `(name, cidr)` pairs. Any malformed CIDR fails the whole set.
    pub fn from_cidrs<'a, I>(cidrs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let networks = cidrs
            .into_iter()
            .map(|(name, cidr)| Network::parse(name, cidr))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(networks))
    }

    /// Name of the most specific network containing `ip`, or `None` when the
    /// address is outside every declared range.
    pub fn classify(&self, ip: IpAddr) -> Option<&str> {
        let ip = ip.to_canonical();

        self.networks
            .iter()
            .find(|network| network.contains(ip))
            .map(|network| network.name.as_ref())
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn contains_network(&self, name: &str) -> bool {
        self.networks.iter().any(|n| n.name.as_ref() == name)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
