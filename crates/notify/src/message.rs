use common::format::usd;
use common::TradingSignal;

/// Plain-text body shared by the chat channels. No markup, so symbol and
/// pattern names with underscores survive every client.
pub fn signal_message(signal: &TradingSignal) -> String {
    let tp = &signal.take_profits;
    let mut targets = format!("TP1: {}", usd(tp.tp1, 2));
    if let Some(tp2) = tp.tp2 {
        targets.push_str(&format!(" | TP2: {}", usd(tp2, 2)));
    }
    if let Some(tp3) = tp.tp3 {
        targets.push_str(&format!(" | TP3: {}", usd(tp3, 2)));
    }

    let conditions = signal
        .conditions_met
        .iter()
        .map(|c| format!("  - {c}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "TRADING SIGNAL DETECTED\n\n\
         {signal_type} {symbol}\n\
         Timeframe: {timeframe}\n\
         Current price: {price}\n\n\
         ENTRY\n   Zone: {zone_min} - {zone_max}\n\n\
         STOP LOSS\n   {stop}\n\n\
         TAKE PROFITS\n   {targets}\n\n\
         R:R: {rr:.2}\n\
         Confidence: {confidence:.0}%\n\
         Pattern: {pattern}\n\n\
         Conditions met:\n{conditions}\n\n\
         {notes}\n\n\
         {time}",
        signal_type = signal.signal_type,
        symbol = signal.symbol,
        timeframe = signal.timeframe,
        price = usd(signal.current_price, 2),
        zone_min = usd(signal.entry_zone.min, 2),
        zone_max = usd(signal.entry_zone.max, 2),
        stop = usd(signal.stop_loss, 2),
        rr = signal.risk_reward_ratio,
        confidence = signal.confidence_score,
        pattern = signal.pattern,
        notes = signal.notes,
        time = signal.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
