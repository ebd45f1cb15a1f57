// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Metrics manifest generator
//!
//! Prints the metrics Service and `ServiceMonitor` the operator would create at
//! startup, as a multi-document YAML stream. Useful for GitOps setups that apply
//! these objects ahead of time instead of granting the operator write access.
//!
//! Usage:
//!   cargo run --bin manifestgen -- --name my-operator --namespace operators > metrics.yaml

use anyhow::Result;
use clap::Parser;
use opsupport::bootstrap::{generate_service, generate_service_monitor};
use opsupport::config::OperatorIdentity;
use opsupport::constants::{DEFAULT_METRICS_PORT, DEFAULT_METRICS_PORT_NAME};
use std::io::Write;

const HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED by manifestgen
# DO NOT EDIT MANUALLY - Run `cargo run --bin manifestgen` to regenerate
";

#[derive(Parser, Debug)]
#[command(version, about = "Print the operator metrics Service and ServiceMonitor as YAML")]
struct Args {
    /// Operator name (Service name and `name` label value)
    #[arg(long)]
    name: String,

    /// Namespace the operator runs in
    #[arg(long)]
    namespace: String,

    /// Metrics port
    #[arg(long, default_value_t = DEFAULT_METRICS_PORT)]
    port: u16,

    /// Metrics port name referenced by the ServiceMonitor
    #[arg(long, default_value = DEFAULT_METRICS_PORT_NAME)]
    port_name: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let identity = OperatorIdentity::new(args.name, args.namespace);

    let service = generate_service(&identity, args.port, &args.port_name)?;
    let service_monitor = generate_service_monitor(&service)?;

    let mut out = std::io::stdout().lock();
    write!(out, "{HEADER}")?;
    writeln!(out, "---")?;
    write!(out, "{}", serde_yaml::to_string(&service)?)?;
    writeln!(out, "---")?;
    write!(out, "{}", serde_yaml::to_string(&service_monitor)?)?;

    Ok(())
}
