use anyhow::{bail, Result};
use std::time::Duration;

use super::args::Cli;
use crate::driver::{DriverConfig, MultinodeConfig};

impl TryFrom<&Cli> for DriverConfig {
    type Error = anyhow::Error;

    fn try_from(cli: &Cli) -> Result<Self> {
        let mut config = DriverConfig::new(&cli.helper, &cli.com_socket);
        config.debug = cli.debug;
        config.handle_c2c = cli.handle_c2c_connections;
        config.tracer = cli.tracer;

        if cli.multinode {
            let (Some(etcd_address), Some(host_address)) = (
                cli.multinode_etcd_address.as_deref().filter(|s| !s.is_empty()),
                cli.multinode_host_address.as_deref().filter(|s| !s.is_empty()),
            ) else {
                bail!("--multinode requires --multinode-etcd-address and --multinode-host-address");
            };
            config.multinode = Some(MultinodeConfig {
                etcd_address: etcd_address.to_string(),
                host_address: host_address.to_string(),
            });
        }

        config.readiness.timeout = cli.ready_timeout_secs.map(Duration::from_secs);
        config.stop_timeout = cli.stop_timeout_secs.map(Duration::from_secs);

        Ok(config)
    }
}
