use chrono::{DateTime, NaiveDate};

use crate::error::DataError;
use crate::odds_api::types::{Bookmaker, OddsEvent};
use crate::types::{Fixture, OddsRecord};

pub const HEAD_TO_HEAD: &str = "h2h";
const DRAW_LABEL: &str = "draw";

struct EventHeader<'a> {
    home_team: &'a str,
    away_team: &'a str,
    date: NaiveDate,
}

fn event_context(ev: &OddsEvent) -> String {
    match (&ev.id, &ev.home_team, &ev.away_team) {
        (Some(id), _, _) => format!("event {}", id),
        (None, Some(h), Some(a)) => format!("event {} vs {}", h, a),
        _ => "event <unidentified>".to_string(),
    }
}

fn parse_commence_date(raw: &str) -> Result<NaiveDate, DataError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.date_naive())
        .map_err(|_| DataError::InvalidField { field: "commence_time", value: raw.to_string() })
}

fn header(ev: &OddsEvent) -> Result<EventHeader<'_>, DataError> {
    let home_team = ev
        .home_team
        .as_deref()
        .ok_or_else(|| DataError::missing("home_team", event_context(ev)))?;
    let away_team = ev
        .away_team
        .as_deref()
        .ok_or_else(|| DataError::missing("away_team", event_context(ev)))?;
    let commence = ev
        .commence_time
        .as_deref()
        .ok_or_else(|| DataError::missing("commence_time", event_context(ev)))?;

    Ok(EventHeader { home_team, away_team, date: parse_commence_date(commence)? })
}

/// One fixture per event, input order preserved.
pub fn prepare_fixtures(events: &[OddsEvent]) -> Result<Vec<Fixture>, DataError> {
    events
        .iter()
        .map(|ev| {
            let h = header(ev)?;
            Ok(Fixture {
                sport: ev.sport_title.clone().unwrap_or_default(),
                home_team: h.home_team.to_string(),
                away_team: h.away_team.to_string(),
                date: h.date,
            })
        })
        .collect()
}

/// One odds record per (event, bookmaker) quoting the head-to-head market,
/// sorted by (date, home team, away team).
pub fn prepare_odds(events: &[OddsEvent]) -> Result<Vec<OddsRecord>, DataError> {
    let mut out: Vec<OddsRecord> = vec![];

    for ev in events {
        let h = header(ev)?;
        for bm in &ev.bookmakers {
            if let Some(rec) = bookmaker_record(ev, &h, bm)? {
                out.push(rec);
            }
        }
    }

    out.sort_by(|a, b| {
        (a.date, &a.home_team, &a.away_team).cmp(&(b.date, &b.home_team, &b.away_team))
    });
    Ok(out)
}

fn bookmaker_record(
    ev: &OddsEvent,
    h: &EventHeader<'_>,
    bm: &Bookmaker,
) -> Result<Option<OddsRecord>, DataError> {
    let Some(market) = bm.markets.iter().find(|m| m.key.as_deref() == Some(HEAD_TO_HEAD)) else {
        return Ok(None);
    };

    let bookmaker = bm
        .key
        .clone()
        .ok_or_else(|| DataError::missing("bookmaker.key", event_context(ev)))?;

    let mut rec = OddsRecord {
        date: h.date,
        home_team: h.home_team.to_string(),
        away_team: h.away_team.to_string(),
        bookmaker,
        last_update: market.last_update.or(bm.last_update),
        home_win: None,
        draw: None,
        away_win: None,
    };

    for o in &market.outcomes {
        let Some(name) = o.name.as_deref() else { continue };
        let slot = if name == h.home_team {
            &mut rec.home_win
        } else if name == h.away_team {
            &mut rec.away_win
        } else if name.eq_ignore_ascii_case(DRAW_LABEL) {
            &mut rec.draw
        } else {
            tracing::trace!(outcome = name, bookmaker = %rec.bookmaker, "dropping unrecognized outcome");
            continue;
        };

        let price = o.price.ok_or_else(|| {
            DataError::missing("outcome.price", format!("{} ({})", event_context(ev), rec.bookmaker))
        })?;
        *slot = Some(price);
    }

    Ok(Some(rec))
}
