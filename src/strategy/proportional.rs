use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::DataError;
use crate::stats::Stats;
use crate::types::{BetRecommendation, EventKey, MarketKind, OddsRecord, Recommendation};
use super::Strategy;

/// Picks the lowest prices across bookmakers and outcomes, one bet per event,
/// and splits `funds` across the picks in proportion to their prices.
#[derive(Clone)]
pub struct ProportionalStakeStrategy {
    pub funds: Decimal,
    pub max_bets: usize,
    pub stats: Arc<Stats>,
}

struct Candidate<'a> {
    record: &'a OddsRecord,
    market: MarketKind,
    price: Decimal,
}

impl ProportionalStakeStrategy {
    /// Long form of the odds table, column-major: all home-win prices in
    /// table order, then draws, then away-wins. Absent prices are dropped.
    fn flatten(odds: &[OddsRecord]) -> Vec<Candidate<'_>> {
        MarketKind::ODDS_COLUMNS
            .iter()
            .flat_map(|&market| {
                odds.iter().filter_map(move |record| {
                    record.price(market).map(|price| Candidate { record, market, price })
                })
            })
            .collect()
    }

    fn select<'a>(&self, mut candidates: Vec<Candidate<'a>>) -> Vec<(EventKey, Candidate<'a>)> {
        // sort_by is stable, so equal prices keep long-form order
        candidates.sort_by(|a, b| a.price.cmp(&b.price));

        let mut seen: HashSet<EventKey> = HashSet::new();
        let mut picked = Vec::with_capacity(self.max_bets);
        for c in candidates {
            if picked.len() >= self.max_bets {
                break;
            }
            let key = c.record.event_key();
            if seen.insert(key.clone()) {
                picked.push((key, c));
            }
        }
        picked
    }

    fn to_bet(event: EventKey, c: &Candidate<'_>, stake: Option<Decimal>) -> BetRecommendation {
        BetRecommendation {
            bet: c.market.describe(&event),
            event,
            market: c.market,
            odds: c.price,
            bookmaker: c.record.bookmaker.clone(),
            stake,
        }
    }
}

/// Currency rounding to cents, half away from zero.
pub fn round_stake(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl Strategy for ProportionalStakeStrategy {
    fn recommend(&self, odds: &[OddsRecord]) -> Result<Recommendation, DataError> {
        if odds.is_empty() {
            return Err(DataError::EmptyOddsTable);
        }
        if self.funds <= Decimal::ZERO {
            return Err(DataError::InvalidInput(format!("funds must be positive, got {}", self.funds)));
        }
        if self.funds.round_dp(2) != self.funds {
            return Err(DataError::InvalidInput(format!("funds must be whole cents, got {}", self.funds)));
        }
        if self.max_bets == 0 {
            return Err(DataError::InvalidInput("max bets must be at least 1".to_string()));
        }

        let picked = self.select(Self::flatten(odds));

        if picked.len() < self.max_bets {
            self.stats.inc_degraded();
            tracing::warn!(
                requested = self.max_bets,
                available = picked.len(),
                "not enough distinct events; returning unallocated picks"
            );
            let bets: Vec<BetRecommendation> =
                picked.into_iter().map(|(ev, c)| Self::to_bet(ev, &c, None)).collect();
            self.stats.add_recommendations(bets.len() as u64);
            return Ok(Recommendation::Insufficient(bets));
        }

        let sum: Decimal = picked.iter().map(|(_, c)| c.price).sum();
        if sum.is_zero() {
            tracing::warn!(picked = picked.len(), "selected prices sum to zero; nothing to allocate");
            return Ok(Recommendation::Empty);
        }

        let mut stakes: Vec<Decimal> = picked
            .iter()
            .map(|(_, c)| round_stake(c.price / sum * self.funds))
            .collect();

        let residual = self.funds - stakes.iter().copied().sum::<Decimal>();
        if !residual.is_zero() {
            tracing::debug!(residual = %residual, "assigning rounding residual to last pick");
            if let Some(last) = stakes.last_mut() {
                *last += residual;
            }
        }

        let bets: Vec<BetRecommendation> = picked
            .into_iter()
            .zip(stakes)
            .map(|((ev, c), stake)| Self::to_bet(ev, &c, Some(stake)))
            .collect();

        for b in &bets {
            tracing::info!(
                date = %b.event.date,
                home = %b.event.home_team,
                away = %b.event.away_team,
                market = ?b.market,
                odds = %b.odds,
                bookmaker = %b.bookmaker,
                stake = ?b.stake,
                "recommendation"
            );
        }

        self.stats.add_recommendations(bets.len() as u64);
        Ok(Recommendation::Allocated(bets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn rec(day: u32, home: &str, away: &str, bm: &str, h: Option<Decimal>, d: Option<Decimal>, a: Option<Decimal>) -> OddsRecord {
        OddsRecord {
            date: NaiveDate::from_ymd_opt(2024, 8, day).unwrap(),
            home_team: home.into(),
            away_team: away.into(),
            bookmaker: bm.into(),
            last_update: None,
            home_win: h,
            draw: d,
            away_win: a,
        }
    }

    fn strategy(funds: Decimal, max_bets: usize) -> ProportionalStakeStrategy {
        ProportionalStakeStrategy { funds, max_bets, stats: Stats::new(0) }
    }

    fn stake_sum(r: &Recommendation) -> Decimal {
        r.bets().iter().filter_map(|b| b.stake).sum()
    }

    #[test]
    fn two_event_example_splits_proportionally() {
        let odds = vec![
            rec(17, "Arsenal", "Wolves", "dk", Some(dec!(1.2)), Some(dec!(6.0)), Some(dec!(11.0))),
            rec(18, "Spurs", "Chelsea", "dk", Some(dec!(3.1)), Some(dec!(3.5)), Some(dec!(2.0))),
        ];

        let r = strategy(dec!(100), 2).recommend(&odds).unwrap();
        let Recommendation::Allocated(bets) = &r else { panic!("expected allocation, got {:?}", r) };
        assert_eq!(bets.len(), 2);

        assert_eq!(bets[0].event.home_team, "Arsenal");
        assert_eq!(bets[0].market, MarketKind::HomeWin);
        assert_eq!(bets[0].stake, Some(dec!(37.50)));
        assert_eq!(bets[0].bet, "bet on Arsenal to win");

        assert_eq!(bets[1].event.home_team, "Spurs");
        assert_eq!(bets[1].market, MarketKind::AwayWin);
        assert_eq!(bets[1].stake, Some(dec!(62.50)));
        assert_eq!(bets[1].bet, "bet on Chelsea to win");

        assert_eq!(stake_sum(&r), dec!(100));
    }

    #[test]
    fn rounding_residual_goes_to_last_pick() {
        // 100 / 3 each -> 33.33 * 3 = 99.99, last absorbs 0.01
        let odds = vec![
            rec(17, "A", "B", "x", Some(dec!(2.0)), None, None),
            rec(18, "C", "D", "x", Some(dec!(2.0)), None, None),
            rec(19, "E", "F", "x", Some(dec!(2.0)), None, None),
        ];

        let r = strategy(dec!(100), 3).recommend(&odds).unwrap();
        let stakes: Vec<Decimal> = r.bets().iter().map(|b| b.stake.unwrap()).collect();
        assert_eq!(stakes, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
        assert_eq!(stake_sum(&r), dec!(100));
    }

    #[rstest]
    #[case(dec!(100), 3)]
    #[case(dec!(57.13), 4)]
    #[case(dec!(1), 5)]
    #[case(dec!(999.99), 2)]
    fn stakes_always_sum_to_funds(#[case] funds: Decimal, #[case] max_bets: usize) {
        let odds = vec![
            rec(10, "A", "B", "x", Some(dec!(1.37)), Some(dec!(4.1)), Some(dec!(7.3))),
            rec(11, "C", "D", "x", Some(dec!(2.91)), Some(dec!(3.3)), Some(dec!(2.45))),
            rec(12, "E", "F", "y", Some(dec!(1.01)), None, Some(dec!(17.0))),
            rec(13, "G", "H", "y", Some(dec!(3.33)), Some(dec!(3.1)), Some(dec!(2.2))),
            rec(14, "I", "J", "z", Some(dec!(1.83)), Some(dec!(3.6)), Some(dec!(4.75))),
        ];

        let r = strategy(funds, max_bets).recommend(&odds).unwrap();
        assert!(matches!(r, Recommendation::Allocated(_)));
        assert_eq!(r.bets().len(), max_bets);
        assert_eq!(stake_sum(&r), funds);
    }

    #[test]
    fn trailing_zero_cents_budget_is_accepted() {
        let odds = vec![
            rec(17, "A", "B", "x", Some(dec!(2.0)), None, None),
            rec(18, "C", "D", "x", Some(dec!(2.0)), None, None),
            rec(19, "E", "F", "x", Some(dec!(2.0)), None, None),
        ];

        let r = strategy(dec!(100.000), 3).recommend(&odds).unwrap();
        for b in r.bets() {
            let stake = b.stake.unwrap();
            assert_eq!(stake, stake.round_dp(2));
        }
        assert_eq!(stake_sum(&r), dec!(100));
    }

    #[test]
    fn one_bet_per_event_across_bookmakers() {
        let odds = vec![
            rec(17, "A", "B", "x", Some(dec!(1.1)), Some(dec!(5.0)), Some(dec!(9.0))),
            rec(17, "A", "B", "y", Some(dec!(1.05)), Some(dec!(5.5)), Some(dec!(9.5))),
            rec(18, "C", "D", "x", Some(dec!(1.9)), Some(dec!(3.2)), Some(dec!(4.0))),
        ];

        let r = strategy(dec!(50), 2).recommend(&odds).unwrap();
        let bets = r.bets();
        assert_eq!(bets.len(), 2);
        assert_ne!(bets[0].event, bets[1].event);
        assert_eq!(bets[0].bookmaker, "y");
        assert_eq!(bets[0].odds, dec!(1.05));
        assert_eq!(bets[1].odds, dec!(1.9));
    }

    #[test]
    fn selection_is_lowest_price_first() {
        let odds = vec![
            rec(10, "A", "B", "x", Some(dec!(4.0)), Some(dec!(3.0)), Some(dec!(1.9))),
            rec(11, "C", "D", "x", Some(dec!(1.2)), Some(dec!(6.0)), Some(dec!(12.0))),
            rec(12, "E", "F", "x", Some(dec!(2.6)), Some(dec!(3.1)), Some(dec!(2.7))),
            rec(13, "G", "H", "x", Some(dec!(1.6)), Some(dec!(3.9)), Some(dec!(5.0))),
        ];

        let r = strategy(dec!(10), 2).recommend(&odds).unwrap();
        let picked: Vec<Decimal> = r.bets().iter().map(|b| b.odds).collect();
        assert_eq!(picked, vec![dec!(1.2), dec!(1.6)]);

        // every unselected event's best price is no lower than the worst pick
        let worst = *picked.iter().max().unwrap();
        let selected: HashSet<EventKey> = r.bets().iter().map(|b| b.event.clone()).collect();
        for o in odds.iter().filter(|o| !selected.contains(&o.event_key())) {
            for m in MarketKind::ODDS_COLUMNS {
                if let Some(p) = o.price(m) {
                    assert!(p >= worst);
                }
            }
        }
    }

    #[test]
    fn equal_prices_keep_long_form_order() {
        // home-win column comes before away-win column in the long form
        let odds = vec![
            rec(10, "A", "B", "x", None, None, Some(dec!(1.5))),
            rec(11, "C", "D", "x", Some(dec!(1.5)), None, None),
        ];

        let r = strategy(dec!(10), 1).recommend(&odds).unwrap();
        assert_eq!(r.bets()[0].event.home_team, "C");
        assert_eq!(r.bets()[0].stake, Some(dec!(10)));
    }

    #[test]
    fn too_few_events_returns_unallocated_picks() {
        let odds = vec![
            rec(10, "A", "B", "x", Some(dec!(1.5)), Some(dec!(3.0)), Some(dec!(2.5))),
            rec(10, "A", "B", "y", Some(dec!(1.4)), None, Some(dec!(2.6))),
            rec(11, "C", "D", "x", None, None, None),
        ];

        let s = strategy(dec!(100), 3);
        let r = s.recommend(&odds).unwrap();
        let Recommendation::Insufficient(bets) = &r else { panic!("expected degraded result, got {:?}", r) };
        assert_eq!(bets.len(), 1);
        assert!(bets.iter().all(|b| b.stake.is_none()));
        assert_eq!(bets[0].bet, "bet on A to win");
        assert_eq!(s.stats.snapshot(0).degraded_results, 1);
    }

    #[test]
    fn all_zero_prices_yield_empty() {
        let odds = vec![
            rec(10, "A", "B", "x", Some(dec!(0)), None, Some(dec!(0))),
            rec(11, "C", "D", "x", Some(dec!(0)), Some(dec!(0)), None),
        ];
        assert_eq!(strategy(dec!(100), 2).recommend(&odds).unwrap(), Recommendation::Empty);
    }

    #[test]
    fn draw_description() {
        let odds = vec![rec(10, "A", "B", "x", Some(dec!(2.0)), Some(dec!(1.8)), Some(dec!(2.2)))];
        let r = strategy(dec!(20), 1).recommend(&odds).unwrap();
        assert_eq!(r.bets()[0].market, MarketKind::Draw);
        assert_eq!(r.bets()[0].bet, "bet on a draw");
    }

    #[test]
    fn empty_table_is_a_data_error() {
        assert_eq!(strategy(dec!(100), 2).recommend(&[]).unwrap_err(), DataError::EmptyOddsTable);
    }

    #[rstest]
    #[case(dec!(0), 2)]
    #[case(dec!(-5), 2)]
    #[case(dec!(100), 0)]
    #[case(dec!(100.005), 3)]
    fn invalid_budget_or_count_rejected(#[case] funds: Decimal, #[case] max_bets: usize) {
        let odds = vec![rec(10, "A", "B", "x", Some(dec!(2.0)), None, None)];
        assert!(matches!(strategy(funds, max_bets).recommend(&odds), Err(DataError::InvalidInput(_))));
    }

    #[test]
    fn unknown_market_description() {
        let ev = EventKey { date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), home_team: "A".into(), away_team: "B".into() };
        assert_eq!(MarketKind::Unknown.describe(&ev), "unknown bet");
    }

    #[rstest]
    #[case(dec!(37.505), dec!(37.51))]
    #[case(dec!(37.504), dec!(37.50))]
    #[case(dec!(0.125), dec!(0.13))]
    fn stakes_round_half_up(#[case] raw: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_stake(raw), expected);
    }
}
