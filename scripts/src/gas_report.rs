//! Plain text report of the gas spent by deployments and method calls

use std::{collections::BTreeMap, fmt::Write as _, fs, path::Path};

use crate::{errors::ScriptError, pricing::TokenPrice};

/// Wei in one gwei
const GWEI: f64 = 1e9;

/// Wei in one ether
const ETHER: f64 = 1e18;

/// Gas used by every recorded call of one method
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct GasSamples(Vec<u64>);

impl GasSamples {
    fn min(&self) -> u64 {
        self.0.iter().copied().min().unwrap_or_default()
    }

    fn max(&self) -> u64 {
        self.0.iter().copied().max().unwrap_or_default()
    }

    fn avg(&self) -> u64 {
        if self.0.is_empty() {
            return 0;
        }
        self.0.iter().sum::<u64>() / self.0.len() as u64
    }
}

/// Collects gas usage while transactions are sent
#[derive(Debug, Default)]
pub struct GasReporter {
    solc_version: String,
    methods: BTreeMap<(String, String), GasSamples>,
    deployments: BTreeMap<String, GasSamples>,
    /// Highest effective gas price seen, in wei
    gas_price: u128,
}

impl GasReporter {
    pub fn new(solc_version: &str) -> Self {
        Self {
            solc_version: solc_version.to_string(),
            ..Default::default()
        }
    }

    /// Record a call of `method` on `contract`
    pub fn record_method(&mut self, contract: &str, method: &str, gas_used: u64, gas_price: u128) {
        self.methods
            .entry((contract.to_string(), method.to_string()))
            .or_default()
            .0
            .push(gas_used);
        self.gas_price = self.gas_price.max(gas_price);
    }

    /// Record the creation of `contract`
    pub fn record_deployment(&mut self, contract: &str, gas_used: u64, gas_price: u128) {
        self.deployments
            .entry(contract.to_string())
            .or_default()
            .0
            .push(gas_used);
        self.gas_price = self.gas_price.max(gas_price);
    }

    /// Render the report, with a fiat column when a price is known
    pub fn render(&self, price: Option<&TokenPrice>) -> String {
        let mut out = String::new();
        let cost_header = price
            .map(|p| format!("{} (avg)", p.currency))
            .unwrap_or_default();

        let _ = writeln!(out, "Solc version: {}", self.solc_version);
        let _ = writeln!(out, "Gas price: {:.2} gwei", self.gas_price as f64 / GWEI);
        if let Some(p) = price {
            let _ = writeln!(out, "Token price: {:.2} {}/{}", p.price, p.currency, p.token);
        }
        out.push('\n');

        let _ = writeln!(
            out,
            "{:<20} {:<16} {:>10} {:>10} {:>10} {:>8} {:>12}",
            "Contract", "Method", "Min", "Max", "Avg", "# calls", cost_header
        );
        for ((contract, method), samples) in &self.methods {
            self.render_row(&mut out, contract, method, samples, price);
        }

        out.push('\n');
        let _ = writeln!(out, "Deployments");
        for (contract, samples) in &self.deployments {
            self.render_row(&mut out, contract, "-", samples, price);
        }

        out
    }

    /// Write the rendered report to `path`
    pub fn write(&self, path: &Path, price: Option<&TokenPrice>) -> Result<(), ScriptError> {
        fs::write(path, self.render(price)).map_err(|e| ScriptError::GasReport(e.to_string()))
    }

    fn render_row(
        &self,
        out: &mut String,
        contract: &str,
        method: &str,
        samples: &GasSamples,
        price: Option<&TokenPrice>,
    ) {
        let cost = price
            .map(|p| format!("{:.2}", self.fiat_cost(samples.avg(), p)))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<20} {:<16} {:>10} {:>10} {:>10} {:>8} {:>12}",
            contract,
            method,
            samples.min(),
            samples.max(),
            samples.avg(),
            samples.0.len(),
            cost
        );
    }

    /// Cost of `gas` at the recorded gas price, in the price's currency
    fn fiat_cost(&self, gas: u64, price: &TokenPrice) -> f64 {
        gas as f64 * self.gas_price as f64 / ETHER * price.price
    }
}
