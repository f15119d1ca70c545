//! Client for the hosted market-analysis endpoint. Only the `/analysis`
//! command uses it; the signal path always scores locally.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::format::usd;
use common::{AnalysisApiConfig, Error, Result};

const ANALYZE_PATH: &str = "/functions/v1/analyze-market";

pub struct RemoteAnalyzer {
    base_url: String,
    api_key: String,
    http: Client,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    symbol: &'a str,
    timeframe: &'a str,
    limit: usize,
}

impl RemoteAnalyzer {
    pub fn new(config: &AnalysisApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http: crate::exchanges::http_client(),
        }
    }

    pub async fn analyze(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<MarketAnalysis> {
        let url = format!("{}{ANALYZE_PATH}", self.base_url);
        debug!(symbol = %symbol, timeframe = %timeframe, "Requesting remote analysis");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&AnalyzeRequest {
                symbol,
                timeframe,
                limit,
            })
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Http(format!("analysis API returned {status}: {body}")));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

/// Every section and field is optional on the wire and falls back to a
/// neutral default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketAnalysis {
    pub symbol: String,
    pub timeframe: String,
    pub current_price: f64,
    pub indicators: RemoteIndicators,
    pub volume_analysis: VolumeAnalysis,
    pub structure: Structure,
    pub trade_plan: TradePlan,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteIndicators {
    pub rsi14: f64,
    pub atr14: f64,
    pub ma20: f64,
    pub ma50: f64,
    pub ma200: f64,
    pub adx: f64,
    pub adx_trend: String,
}

impl Default for RemoteIndicators {
    fn default() -> Self {
        Self {
            rsi14: 50.0,
            atr14: 0.0,
            ma20: 0.0,
            ma50: 0.0,
            ma200: 0.0,
            adx: 0.0,
            adx_trend: "weak".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeAnalysis {
    pub avg_volume: f64,
    pub current_volume: f64,
    pub relative_volume: f64,
    pub is_volume_spike: bool,
}

impl Default for VolumeAnalysis {
    fn default() -> Self {
        Self {
            avg_volume: 0.0,
            current_volume: 0.0,
            relative_volume: 1.0,
            is_volume_spike: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Structure {
    pub bias: String,
    pub pattern: String,
}

impl Default for Structure {
    fn default() -> Self {
        Self {
            bias: "neutral".into(),
            pattern: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradePlan {
    pub side: Option<String>,
    pub entry: Option<f64>,
    pub stop: Option<f64>,
    pub targets: Vec<f64>,
    pub risk_reward_ratio: f64,
    pub setup: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Confidence {
    pub score: u32,
    pub grade: String,
}

impl Default for Confidence {
    fn default() -> Self {
        Self {
            score: 0,
            grade: "F".into(),
        }
    }
}

impl MarketAnalysis {
    /// Plain-text report for the command bot.
    pub fn render(&self) -> String {
        let ind = &self.indicators;
        let vol = &self.volume_analysis;
        let plan = &self.trade_plan;

        let mut out = format!(
            "REMOTE ANALYSIS | {} {}\n\n\
             Price: {}\n\
             Bias: {} | Pattern: {}\n\n\
             RSI14: {:.1} | ATR14: {}\n\
             MA20: {} | MA50: {} | MA200: {}\n\
             ADX: {:.1} ({})\n\
             Relative volume: {:.2}x{}\n\n\
             Confidence: {} ({})",
            self.symbol,
            self.timeframe,
            usd(self.current_price, 2),
            self.structure.bias,
            if self.structure.pattern.is_empty() { "-" } else { self.structure.pattern.as_str() },
            ind.rsi14,
            usd(ind.atr14, 2),
            usd(ind.ma20, 2),
            usd(ind.ma50, 2),
            usd(ind.ma200, 2),
            ind.adx,
            ind.adx_trend,
            vol.relative_volume,
            if vol.is_volume_spike { " (spike)" } else { "" },
            self.confidence.score,
            self.confidence.grade,
        );

        if let (Some(side), Some(entry), Some(stop)) = (&plan.side, plan.entry, plan.stop) {
            let targets = plan
                .targets
                .iter()
                .map(|t| usd(*t, 2))
                .collect::<Vec<_>>()
                .join(" / ");
            out.push_str(&format!(
                "\n\nPlan: {} {}\n  Entry: {}\n  Stop: {}\n  Targets: {}\n  R:R: {:.2}",
                side.to_uppercase(),
                plan.setup,
                usd(entry, 2),
                usd(stop, 2),
                if targets.is_empty() { "-".to_string() } else { targets },
                plan.risk_reward_ratio,
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default() {
        let analysis: MarketAnalysis =
            serde_json::from_str(r#"{"symbol":"BTCUSDT","currentPrice":94350.0}"#).unwrap();
        assert_eq!(analysis.indicators.rsi14, 50.0);
        assert_eq!(analysis.volume_analysis.relative_volume, 1.0);
        assert_eq!(analysis.structure.bias, "neutral");
        assert_eq!(analysis.confidence.grade, "F");
        assert!(!analysis.render().contains("Plan:"));
    }

    #[tokio::test]
    async fn posts_with_bearer_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", ANALYZE_PATH)
            .match_header("authorization", "Bearer anon-key")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "symbol": "BTCUSDT",
                "timeframe": "4h",
                "limit": 500
            })))
            .with_status(200)
            .with_body(
                r#"{
                    "symbol": "BTCUSDT",
                    "timeframe": "4h",
                    "currentPrice": 94350.0,
                    "indicators": {"rsi14": 43.2, "adxTrend": "moderate"},
                    "tradePlan": {"side": "long", "entry": 94300, "stop": 93000,
                                  "targets": [95800, 97000], "riskRewardRatio": 1.15,
                                  "setup": "pullback"},
                    "confidence": {"score": 72, "grade": "B"}
                }"#,
            )
            .create_async()
            .await;

        let analyzer = RemoteAnalyzer::new(&AnalysisApiConfig {
            base_url: format!("{}/", server.url()),
            api_key: "anon-key".into(),
        });
        let analysis = analyzer.analyze("BTCUSDT", "4h", 500).await.unwrap();

        mock.assert_async().await;
        assert_eq!(analysis.confidence.score, 72);
        let text = analysis.render();
        assert!(text.contains("Plan: LONG pullback"));
        assert!(text.contains("Targets: $95,800.00 / $97,000.00"));
    }

    #[tokio::test]
    async fn server_error_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ANALYZE_PATH)
            .with_status(500)
            .create_async()
            .await;

        let analyzer = RemoteAnalyzer::new(&AnalysisApiConfig {
            base_url: server.url(),
            api_key: "k".into(),
        });
        assert!(matches!(
            analyzer.analyze("BTCUSDT", "1h", 100).await,
            Err(Error::Http(_))
        ));
    }
}
