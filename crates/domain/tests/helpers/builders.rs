#![allow(dead_code)]

/// The split-horizon example used across the test suite: `lan` is nested in
/// `vpn`, each network has its own chain.
pub const SPLIT_HORIZON_JSON: &str = r#"{
    "cidrs": {
        "lan": "10.0.0.0/24",
        "vpn": "10.0.0.0/16"
    },
    "resolvers": {
        "hosts": { "type": "static", "hosts": { "nas.home": "10.0.0.10" } },
        "upstream": { "type": "delegating", "socket": "1.1.1.1:53" },
        "backup": { "type": "delegating", "socket": "9.9.9.9" }
    },
    "configuration": {
        "lan": ["hosts", "upstream"],
        "vpn": ["upstream", "backup"]
    }
}"#;

pub struct ConfigJsonBuilder {
    cidrs: Vec<(String, String)>,
    resolvers: Vec<(String, String)>,
    chains: Vec<(String, Vec<String>)>,
}

impl ConfigJsonBuilder {
    pub fn new() -> Self {
        Self {
            cidrs: Vec::new(),
            resolvers: Vec::new(),
            chains: Vec::new(),
        }
    }

    pub fn cidr(mut self, name: &str, cidr: &str) -> Self {
        self.cidrs.push((name.to_string(), cidr.to_string()));
        self
    }

    pub fn delegating(mut self, name: &str, socket: &str) -> Self {
        self.resolvers.push((
            name.to_string(),
            format!(r#"{{"type": "delegating", "socket": "{}"}}"#, socket),
        ));
        self
    }

    pub fn static_host(mut self, name: &str, host: &str, address: &str) -> Self {
        self.resolvers.push((
            name.to_string(),
            format!(r#"{{"type": "static", "hosts": {{"{}": "{}"}}}}"#, host, address),
        ));
        self
    }

    pub fn chain(mut self, network: &str, resolvers: &[&str]) -> Self {
        self.chains.push((
            network.to_string(),
            resolvers.iter().map(|r| r.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> String {
        let cidrs = self
            .cidrs
            .iter()
            .map(|(n, c)| format!(r#""{}": "{}""#, n, c))
            .collect::<Vec<_>>()
            .join(", ");
        let resolvers = self
            .resolvers
            .iter()
            .map(|(n, r)| format!(r#""{}": {}"#, n, r))
            .collect::<Vec<_>>()
            .join(", ");
        let chains = self
            .chains
            .iter()
            .map(|(n, rs)| {
                let list = rs
                    .iter()
                    .map(|r| format!(r#""{}""#, r))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(r#""{}": [{}]"#, n, list)
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"{{"cidrs": {{{}}}, "resolvers": {{{}}}, "configuration": {{{}}}}}"#,
            cidrs, resolvers, chains
        )
    }
}
