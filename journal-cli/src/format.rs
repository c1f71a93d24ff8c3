//! Presentation formatting: cents rounding, sign prefixes, percent suffixes.
//!
//! The engine returns raw values; rounding happens here and nowhere else.

use journal_core::{Position, PositionSummary};

/// Round to cents, folding `-0.00` into `0.00`.
fn cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Signed money amount: `+12.34`, `-5.00`.
pub fn money(value: f64) -> String {
    format!("{:+.2}", cents(value))
}

/// Unsigned money amount: `12.34`.
pub fn amount(value: f64) -> String {
    format!("{:.2}", cents(value))
}

pub fn percent(value: f64) -> String {
    format!("{:.2}%", cents(value))
}

pub fn r_units(value: f64) -> String {
    format!("{:.2}R", cents(value))
}

/// Render an optional value, `-` when absent.
pub fn opt(value: Option<f64>, render: fn(f64) -> String) -> String {
    value.map(render).unwrap_or_else(|| "-".into())
}

/// Raw value without rounding, for prices and sizes.
pub fn raw(value: f64) -> String {
    format!("{value}")
}

pub fn print_position(position: &Position, summary: &PositionSummary) {
    println!("Position:     {}", summary.id);
    println!("Symbol:       {}", summary.symbol);
    if let Some(account) = position.account_id() {
        println!("Account:      {account}");
    }
    if let Some(date) = position.trade_date() {
        println!("Date:         {date}");
    }
    println!("Status:       {}", summary.status);
    println!("Direction:    {}", summary.direction.as_str());
    println!("Entry:        {}", opt(position.entry_price(), raw));
    println!("Stop:         {}", opt(position.stop_price(), raw));
    println!("Target:       {}", opt(position.target_price(), raw));
    let breakeven = position.breakeven();
    if breakeven.moved {
        println!("Breakeven:    moved at {}", opt(breakeven.price, raw));
    }
    println!(
        "Size:         {} (closed {}, remaining {})",
        raw(summary.size),
        raw(summary.closed_size),
        raw(summary.remaining_size)
    );
    println!();

    if !position.scale_outs().is_empty() {
        println!("{:<6} {:>12} {:>14} {:>12}", "Leg", "Size", "Price", "PnL");
        println!("{}", "-".repeat(47));
        for leg in position.scale_outs() {
            println!(
                "{:<6} {:>12} {:>14} {:>12}",
                leg.id,
                raw(leg.size),
                raw(leg.price),
                money(journal_core::pnl::leg_pnl(position, leg))
            );
        }
        println!();
    }

    println!("Avg exit:     {}", opt(summary.average_exit_price, raw));
    println!("Realized:     {}", money(summary.realized_pnl));
    println!("Unrealized:   {}", opt(summary.unrealized_pnl, money));
    let manual = if summary.manual_override { " (manual)" } else { "" };
    println!("Total PnL:    {}{manual}", money(summary.total_pnl));
    if let Some(outcome) = summary.outcome {
        println!("Outcome:      {outcome:?}");
    }
    println!();
    println!("Risk/unit:    {}", opt(summary.risk_per_unit, raw));
    println!("Risk:         {}", opt(summary.risk_amount, amount));
    println!("Risk %:       {}", opt(summary.risk_percent, percent));
    println!("Reward:       {}", opt(summary.reward_amount, amount));
    println!("R-multiple:   {}", opt(summary.r_multiple, r_units));
    println!("Realized R:   {}", opt(summary.realized_r, r_units));
}
