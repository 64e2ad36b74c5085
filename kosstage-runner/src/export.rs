//! Artifact export: UTF-8 BOM trade-ledger CSV, and (behind the `plots`
//! feature) equity-curve and drawdown PNG charts via `plotters`.

use std::path::Path;

use anyhow::{Context, Result};

use kosstage_core::domain::TradeRecord;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Serialize the closed-trade ledger to a UTF-8 BOM CSV, matching the
/// column order of §3's trade ledger.
pub fn trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record([
        "date",
        "ticker",
        "action",
        "shares",
        "entry_price",
        "exit_price",
        "pnl",
        "return_pct",
        "holding_days",
        "reason",
        "commission",
    ])?;
    for t in trades {
        wtr.write_record([
            t.date.to_string(),
            t.ticker.clone(),
            t.action.clone(),
            t.shares.to_string(),
            format!("{:.2}", t.entry_price),
            format!("{:.2}", t.exit_price),
            format!("{:.2}", t.pnl),
            format!("{:.6}", t.return_pct),
            t.holding_days.to_string(),
            t.reason.clone(),
            format!("{:.2}", t.commission),
        ])?;
    }
    let body = wtr.into_inner().context("failed to flush trade ledger CSV writer")?;
    let mut out = Vec::with_capacity(UTF8_BOM.len() + body.len());
    out.extend_from_slice(UTF8_BOM);
    out.extend_from_slice(&body);
    String::from_utf8(out).context("trade ledger CSV output is not valid UTF-8")
}

/// Write the trade ledger CSV directly to a file.
pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let csv = trades_csv(trades)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(feature = "plots")]
pub mod plots {
    use super::*;
    use kosstage_core::domain::Snapshot;
    use plotters::prelude::*;

    /// Render the equity curve as a line chart.
    pub fn plot_equity_curve(history: &[Snapshot], output_path: &Path) -> Result<()> {
        if history.is_empty() {
            anyhow::bail!("cannot plot an empty snapshot history");
        }
        let root = BitMapBackend::new(output_path, (1024, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let min_date = history.first().unwrap().date;
        let max_date = history.last().unwrap().date;
        let min_equity = history.iter().map(|s| s.equity).fold(f64::INFINITY, f64::min);
        let max_equity = history.iter().map(|s| s.equity).fold(f64::NEG_INFINITY, f64::max);
        let pad = (max_equity - min_equity).max(1.0) * 0.05;

        let mut chart = ChartBuilder::on(&root)
            .caption("Equity Curve", ("sans-serif", 28).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(min_date..max_date, (min_equity - pad)..(max_equity + pad))?;

        chart.configure_mesh().x_labels(10).y_labels(10).y_desc("Equity").draw()?;

        chart.draw_series(LineSeries::new(history.iter().map(|s| (s.date, s.equity)), &BLUE))?;

        root.present().context("failed to flush equity curve plot")?;
        Ok(())
    }

    /// Render the drawdown series as a filled area below zero.
    pub fn plot_drawdown(history: &[Snapshot], output_path: &Path) -> Result<()> {
        if history.is_empty() {
            anyhow::bail!("cannot plot an empty snapshot history");
        }
        let mut peak = history[0].equity;
        let series: Vec<(chrono::NaiveDate, f64)> = history
            .iter()
            .map(|s| {
                if s.equity > peak {
                    peak = s.equity;
                }
                let dd = if peak > 0.0 { (s.equity / peak - 1.0) * 100.0 } else { 0.0 };
                (s.date, dd)
            })
            .collect();

        let root = BitMapBackend::new(output_path, (1024, 400)).into_drawing_area();
        root.fill(&WHITE)?;

        let min_date = series.first().unwrap().0;
        let max_date = series.last().unwrap().0;
        let min_dd = series.iter().map(|p| p.1).fold(0.0_f64, f64::min) - 1.0;

        let mut chart = ChartBuilder::on(&root)
            .caption("Drawdown", ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(min_date..max_date, min_dd..1.0_f64)?;

        chart.configure_mesh().x_labels(10).y_labels(6).y_desc("Drawdown %").draw()?;

        chart.draw_series(AreaSeries::new(series.into_iter(), 0.0, RED.mix(0.3)).border_style(RED))?;

        root.present().context("failed to flush drawdown plot")?;
        Ok(())
    }
}
