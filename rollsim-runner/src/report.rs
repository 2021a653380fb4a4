//! Reporting and export — CSV and JSON artifact generation.
//!
//! The three append-only logs (account values, holdings, realized trades)
//! are the run's entire outbound contract: no statistics are computed here,
//! only faithful serialization for external analysis tools.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rollsim_core::domain::{PositionSnapshot, TradeRecord, ValueSnapshot};

use crate::engine::Engine;

// ─── CSV export ─────────────────────────────────────────────────────

/// Account value curve, one row per reconcile.
pub fn export_values_csv(values: &[ValueSnapshot]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "value",
        "cash",
        "long_equity",
        "short_equity",
        "unrealized_pnl",
    ])?;
    for v in values {
        wtr.write_record([
            &v.date.to_string(),
            &format!("{:.2}", v.value),
            &format!("{:.2}", v.cash),
            &format!("{:.2}", v.long_equity),
            &format!("{:.2}", v.short_equity),
            &format!("{:.2}", v.unrealized_pnl),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Holdings tape, one row per open position per reconcile.
pub fn export_holdings_csv(holdings: &[PositionSnapshot]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "identifier",
        "class",
        "side",
        "units",
        "cost_basis",
        "market_value",
        "unrealized_pnl",
        "avg_price",
    ])?;
    for h in holdings {
        wtr.write_record([
            &h.date.to_string(),
            &h.identifier,
            &format!("{:?}", h.class),
            &format!("{:?}", h.side),
            &format!("{:.6}", h.units),
            &format!("{:.2}", h.cost_basis),
            &format!("{:.2}", h.market_value),
            &format!("{:.2}", h.unrealized_pnl),
            &format!("{:.6}", h.avg_price),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Realized trade tape, crossing fills and forced settlements.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "identifier",
        "class",
        "units",
        "percent_change",
        "gross_pnl",
        "per_unit_pnl",
        "settlement",
    ])?;
    for t in trades {
        wtr.write_record([
            &t.date.to_string(),
            &t.identifier,
            &format!("{:?}", t.class),
            &format!("{:.6}", t.units),
            &format!("{:.6}", t.percent_change),
            &format!("{:.2}", t.gross_pnl),
            &format!("{:.6}", t.per_unit_pnl),
            &t.settlement.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Paths of everything written by `export_run`.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub values_csv: PathBuf,
    pub holdings_csv: PathBuf,
    pub trades_csv: PathBuf,
    pub values_json: PathBuf,
    pub holdings_json: PathBuf,
    pub trades_json: PathBuf,
}

/// Write the full artifact set for a finished run.
///
/// Creates `{output_dir}/{run_id_short}/` containing each log as both CSV
/// and JSON.
pub fn export_run(output_dir: impl AsRef<Path>, engine: &Engine) -> Result<ArtifactPaths> {
    let dir = output_dir.as_ref().join(engine.run_id().short());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create artifact directory {}", dir.display()))?;

    let portfolio = engine.portfolio();

    let write = |name: &str, contents: String| -> Result<PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    };
    let values_csv = write("values.csv", export_values_csv(portfolio.values())?)?;
    let holdings_csv = write("holdings.csv", export_holdings_csv(portfolio.holdings())?)?;
    let trades_csv = write("trades.csv", export_trades_csv(portfolio.trades())?)?;

    let values_json = write(
        "values.json",
        serde_json::to_string_pretty(portfolio.values())
            .context("failed to serialize values log")?,
    )?;
    let holdings_json = write(
        "holdings.json",
        serde_json::to_string_pretty(portfolio.holdings())
            .context("failed to serialize holdings log")?,
    )?;
    let trades_json = write(
        "trades.json",
        serde_json::to_string_pretty(portfolio.trades())
            .context("failed to serialize trades log")?,
    )?;

    Ok(ArtifactPaths {
        dir,
        values_csv,
        holdings_csv,
        trades_csv,
        values_json,
        holdings_json,
        trades_json,
    })
}
