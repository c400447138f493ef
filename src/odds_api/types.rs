use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::Deserializer;
use serde::Deserialize;

fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Event object from `GET /v4/sports/{sport}/odds`.
///
/// Required fields are kept optional here so that a partial record still
/// decodes and the normalizer can report exactly which field is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OddsEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sport_key: Option<String>,
    #[serde(default)]
    pub sport_title: Option<String>,
    #[serde(default)]
    pub commence_time: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bookmaker {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub markets: Vec<Market>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Market {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Outcome {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decodes_provider_payload() {
        let body = r#"[{
            "id": "e912304de2b2ce35b473ce2ecd3d1502",
            "sport_key": "soccer_epl",
            "sport_title": "EPL",
            "commence_time": "2024-08-17T14:00:00Z",
            "home_team": "Arsenal",
            "away_team": "Wolverhampton Wanderers",
            "bookmakers": [{
                "key": "draftkings",
                "title": "DraftKings",
                "last_update": "2024-08-16T09:12:44Z",
                "markets": [{
                    "key": "h2h",
                    "last_update": "2024-08-16T09:12:44Z",
                    "outcomes": [
                        {"name": "Arsenal", "price": 1.24},
                        {"name": "Wolverhampton Wanderers", "price": 11.5},
                        {"name": "Draw", "price": 6.25}
                    ]
                }]
            }]
        }]"#;

        let events: Vec<OddsEvent> = serde_json::from_str(body).unwrap();
        assert_eq!(events.len(), 1);
        let bm = &events[0].bookmakers[0];
        assert_eq!(bm.key.as_deref(), Some("draftkings"));
        assert!(bm.last_update.is_some());
        assert_eq!(bm.markets[0].outcomes[0].price, Some(dec!(1.24)));
        assert_eq!(bm.markets[0].outcomes[1].price, Some(dec!(11.5)));
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let body = r#"{"home_team": "A", "away_team": "B", "bookmakers": null}"#;
        let ev: OddsEvent = serde_json::from_str(body).unwrap();
        assert!(ev.bookmakers.is_empty());
        assert!(ev.commence_time.is_none());
    }
}
