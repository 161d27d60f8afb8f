use std::path::Path;

use super::DriverConfig;
use crate::types::BypassSpec;

/// Build the helper's command line for `spec`.
///
/// Every flag is self-contained (`--name=value`), so the order only matters
/// for readability of the logged command. The `--ready-fd` flag is added by
/// the driver together with the pipe it refers to.
pub fn build_args(spec: &BypassSpec, config: &DriverConfig) -> Vec<String> {
    let mut args = Vec::new();

    if config.debug {
        args.push("--debug".to_string());
    }

    if let Some(path) = non_empty(spec.socket_path.as_deref()) {
        args.push(format!("--socket={}", path.display()));
    }
    if let Some(path) = non_empty(spec.pid_file_path.as_deref()) {
        args.push(format!("--pid-file={}", path.display()));
    }
    if let Some(path) = non_empty(spec.log_file_path.as_deref()) {
        args.push(format!("--log-file={}", path.display()));
    }

    for mapping in &spec.port_mapping {
        args.push(format!("-p={}", mapping));
    }

    for subnet in &spec.ignore_subnets {
        args.push(format!("--ignore={}", subnet));
    }

    if spec.ignore_bind {
        args.push("--ignore-bind".to_string());
    }

    args.push(format!("--com-socket={}", config.com_socket_path.display()));

    if config.handle_c2c {
        args.push("--handle-c2c-connections".to_string());
    }
    if config.tracer {
        args.push("--tracer=true".to_string());
    }
    if let Some(multinode) = &config.multinode {
        args.push("--multinode=true".to_string());
        args.push(format!(
            "--multinode-etcd-address={}",
            multinode.etcd_address
        ));
        args.push(format!(
            "--multinode-host-address={}",
            multinode.host_address
        ));
    }

    args
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}
