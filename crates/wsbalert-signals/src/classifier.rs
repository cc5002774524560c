//! Threshold classifier for mention spikes.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use wsbalert_core::{Signal, SignalPolicy, SignalThresholds, TickerMention, TickerSeries};

use crate::types::ClassifiedTicker;
use crate::window::{previous_day_count, trailing_average};

/// Per-ticker figures the classifier decides on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInput {
    pub mentions: u64,
    pub average: f64,
    pub previous_day: Option<u64>,
    pub top_ranked: bool,
}

impl SignalInput {
    #[must_use]
    pub fn ratio(&self) -> f64 {
        mention_ratio(self.mentions, self.average)
    }

    #[must_use]
    pub fn trend_pct(&self) -> Option<f64> {
        trend_pct(self.mentions, self.previous_day)
    }
}

/// `mentions / average`, defined as `0.0` when the average is not positive.
#[must_use]
pub fn mention_ratio(mentions: u64, average: f64) -> f64 {
    if average > 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let m = mentions as f64;
        m / average
    } else {
        0.0
    }
}

/// Day-over-day change in percent. `None` when yesterday is unknown or zero.
#[must_use]
pub fn trend_pct(mentions: u64, previous_day: Option<u64>) -> Option<f64> {
    match previous_day {
        Some(prev) if prev > 0 => {
            #[allow(clippy::cast_precision_loss)]
            let (today, prev) = (mentions as f64, prev as f64);
            Some((today - prev) / prev * 100.0)
        }
        _ => None,
    }
}

/// The `n` most-mentioned tickers this run.
///
/// Ties keep upstream order.
#[must_use]
pub fn top_tickers(mentions: &[TickerMention], n: usize) -> HashSet<&str> {
    let mut ranked: Vec<&TickerMention> = mentions.iter().collect();
    ranked.sort_by(|a, b| b.mentions.cmp(&a.mentions));
    ranked.into_iter().take(n).map(|m| m.ticker.as_str()).collect()
}

/// Tickers whose mentions meet `threshold`, in their original order.
#[must_use]
pub fn spikes(classified: &[ClassifiedTicker], threshold: u64) -> Vec<ClassifiedTicker> {
    classified
        .iter()
        .filter(|c| c.mentions >= threshold)
        .cloned()
        .collect()
}

/// Applies a [`SignalPolicy`] with fixed [`SignalThresholds`].
#[derive(Debug, Clone, Copy)]
pub struct SignalClassifier {
    policy: SignalPolicy,
    thresholds: SignalThresholds,
}

impl SignalClassifier {
    #[must_use]
    pub fn new(policy: SignalPolicy, thresholds: SignalThresholds) -> Self {
        Self { policy, thresholds }
    }

    #[must_use]
    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    /// Label a single ticker.
    #[must_use]
    pub fn classify(&self, input: &SignalInput) -> Signal {
        match self.policy {
            SignalPolicy::Standard => self.classify_standard(input),
            SignalPolicy::Momentum => self.classify_momentum(input),
        }
    }

    /// Label every fetched ticker against its stored history.
    ///
    /// Output order matches `mentions`.
    #[must_use]
    pub fn classify_all(
        &self,
        mentions: &[TickerMention],
        history: &BTreeMap<String, TickerSeries>,
        today: NaiveDate,
    ) -> Vec<ClassifiedTicker> {
        let top = top_tickers(mentions, self.thresholds.top_n);

        mentions
            .iter()
            .map(|m| {
                let series = history.get(&m.ticker);
                let input = SignalInput {
                    mentions: m.mentions,
                    average: trailing_average(series, today, self.thresholds.average_window_days),
                    previous_day: previous_day_count(series, today).or(m.mentions_24h_ago),
                    top_ranked: top.contains(m.ticker.as_str()),
                };
                let signal = self.classify(&input);
                tracing::trace!(
                    ticker = %m.ticker,
                    mentions = input.mentions,
                    average = input.average,
                    %signal,
                    "classified ticker"
                );
                ClassifiedTicker {
                    ticker: m.ticker.clone(),
                    mentions: input.mentions,
                    average: input.average,
                    ratio: input.ratio(),
                    previous_day: input.previous_day,
                    trend_pct: input.trend_pct(),
                    top_ranked: input.top_ranked,
                    signal,
                }
            })
            .collect()
    }

    fn classify_standard(&self, input: &SignalInput) -> Signal {
        let t = &self.thresholds;
        if input.mentions < t.mention_threshold {
            return Signal::Neutral;
        }

        let ratio = input.ratio();
        if ratio >= t.sell_multiplier && (input.mentions >= t.sell_floor || input.top_ranked) {
            Signal::Sell
        } else if ratio >= t.buy_multiplier && ratio < t.sell_multiplier {
            Signal::Buy
        } else {
            Signal::Neutral
        }
    }

    fn classify_momentum(&self, input: &SignalInput) -> Signal {
        let t = &self.thresholds;
        if input.mentions < t.mention_threshold {
            return Signal::Neutral;
        }

        let ratio = input.ratio();
        let trend = input.trend_pct();
        let dropped = trend.is_some_and(|p| p <= -t.drop_pct);
        let rising = trend.is_none_or(|p| p >= t.momentum_pct);

        if ratio >= t.sell_multiplier || dropped {
            Signal::Sell
        } else if ratio >= t.buy_multiplier && rising {
            Signal::Buy
        } else {
            Signal::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use wsbalert_core::MentionRecord;

    use super::*;

    fn standard() -> SignalClassifier {
        SignalClassifier::new(SignalPolicy::Standard, SignalThresholds::default())
    }

    fn momentum() -> SignalClassifier {
        SignalClassifier::new(SignalPolicy::Momentum, SignalThresholds::default())
    }

    fn input(mentions: u64, average: f64, top_ranked: bool) -> SignalInput {
        SignalInput {
            mentions,
            average,
            previous_day: None,
            top_ranked,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).expect("valid date")
    }

    #[test]
    fn zero_average_gives_zero_ratio() {
        assert_eq!(mention_ratio(900, 0.0), 0.0);
        assert_eq!(input(900, 0.0, true).ratio(), 0.0);
    }

    #[test]
    fn zero_average_is_neutral_even_when_top_ranked() {
        assert_eq!(standard().classify(&input(5_000, 0.0, true)), Signal::Neutral);
    }

    #[test]
    fn high_ratio_top_ranked_spike_is_sell() {
        // 850 / 300 ≈ 2.83
        assert_eq!(standard().classify(&input(850, 300.0, true)), Signal::Sell);
    }

    #[test]
    fn high_ratio_above_floor_is_sell_without_rank() {
        assert_eq!(standard().classify(&input(850, 300.0, false)), Signal::Sell);
    }

    #[test]
    fn high_ratio_below_floor_and_unranked_is_neutral() {
        // 700 / 300 ≈ 2.33 but neither >= 800 nor top-3.
        assert_eq!(standard().classify(&input(700, 300.0, false)), Signal::Neutral);
    }

    #[test]
    fn high_ratio_below_floor_but_top_ranked_is_sell() {
        assert_eq!(standard().classify(&input(700, 300.0, true)), Signal::Sell);
    }

    #[test]
    fn moderate_ratio_is_buy() {
        // 400 / 300 ≈ 1.33, inside [1.3, 2.0)
        assert_eq!(standard().classify(&input(400, 300.0, false)), Signal::Buy);
    }

    #[test]
    fn buy_band_lower_bound_is_inclusive() {
        assert_eq!(standard().classify(&input(390, 300.0, false)), Signal::Buy);
    }

    #[test]
    fn ratio_below_buy_band_is_neutral() {
        assert_eq!(standard().classify(&input(360, 300.0, true)), Signal::Neutral);
    }

    #[test]
    fn below_mention_threshold_is_always_neutral() {
        for avg in [0.0, 10.0, 100.0, 190.0] {
            assert_eq!(standard().classify(&input(250, avg, true)), Signal::Neutral);
            assert_eq!(momentum().classify(&input(250, avg, true)), Signal::Neutral);
        }
    }

    #[test]
    fn trend_pct_requires_nonzero_previous_day() {
        assert_eq!(trend_pct(500, None), None);
        assert_eq!(trend_pct(500, Some(0)), None);
        let pct = trend_pct(150, Some(100)).unwrap();
        assert!((pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn momentum_sells_on_sharp_drop() {
        let mut i = input(400, 380.0, false);
        i.previous_day = Some(800);
        assert_eq!(momentum().classify(&i), Signal::Sell);
    }

    #[test]
    fn momentum_buys_on_rising_ratio() {
        let mut i = input(400, 300.0, false);
        i.previous_day = Some(300);
        assert_eq!(momentum().classify(&i), Signal::Buy);
    }

    #[test]
    fn momentum_holds_when_growth_stalls() {
        let mut i = input(400, 300.0, false);
        i.previous_day = Some(390);
        assert_eq!(momentum().classify(&i), Signal::Neutral);
    }

    #[test]
    fn momentum_sells_on_high_ratio_regardless_of_rank() {
        assert_eq!(momentum().classify(&input(700, 300.0, false)), Signal::Sell);
    }

    #[test]
    fn top_tickers_ranks_by_mentions_with_stable_ties() {
        let mentions = vec![
            TickerMention::new("A", 100),
            TickerMention::new("B", 500),
            TickerMention::new("C", 300),
            TickerMention::new("D", 300),
            TickerMention::new("E", 50),
        ];
        let top = top_tickers(&mentions, 3);
        assert_eq!(top, HashSet::from(["B", "C", "D"]));
        let top2 = top_tickers(&mentions, 2);
        assert_eq!(top2, HashSet::from(["B", "C"]));
    }

    #[test]
    fn classify_all_uses_history_and_keeps_order() {
        let history: BTreeMap<String, TickerSeries> = [
            ("GME", vec![(8, 300), (9, 300)]),
            ("AMC", vec![(9, 300)]),
        ]
        .into_iter()
        .map(|(ticker, rows)| {
            let records = rows
                .into_iter()
                .map(|(d, mentions)| MentionRecord {
                    date: day(d),
                    ticker: ticker.to_string(),
                    mentions,
                })
                .collect();
            (ticker.to_string(), TickerSeries::from_records(ticker, records))
        })
        .collect();

        let mentions = vec![
            TickerMention::new("AMC", 400),
            TickerMention::new("GME", 850),
            TickerMention::new("NEW", 1_000),
            TickerMention::new("LOW", 10),
        ];

        let classified = standard().classify_all(&mentions, &history, day(10));
        let labels: Vec<(&str, Signal)> = classified
            .iter()
            .map(|c| (c.ticker.as_str(), c.signal))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("AMC", Signal::Buy),
                ("GME", Signal::Sell),
                ("NEW", Signal::Neutral),
                ("LOW", Signal::Neutral),
            ]
        );

        let gme = &classified[1];
        assert!((gme.average - 300.0).abs() < 1e-9);
        assert_eq!(gme.previous_day, Some(300));
        assert!(gme.top_ranked);
        assert_eq!(classified[2].ratio, 0.0);
    }

    #[test]
    fn classify_all_falls_back_to_upstream_previous_day() {
        let mut mention = TickerMention::new("TSLA", 500);
        mention.mentions_24h_ago = Some(250);
        let classified = standard().classify_all(&[mention], &BTreeMap::new(), day(10));
        assert_eq!(classified[0].previous_day, Some(250));
        let pct = classified[0].trend_pct.unwrap();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn spikes_filters_by_threshold_in_order() {
        let mentions = vec![
            TickerMention::new("A", 299),
            TickerMention::new("B", 300),
            TickerMention::new("C", 900),
        ];
        let classified = standard().classify_all(&mentions, &BTreeMap::new(), day(10));
        let s = spikes(&classified, 300);
        let tickers: Vec<&str> = s.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["B", "C"]);
    }
}
