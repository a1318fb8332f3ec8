//! Dashboard HTML page handler for the quiz bank service.

use crate::routes::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use quiz_bank_types::Question;
use std::collections::HashMap;
use std::sync::Arc;

pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = &state.store;
    let uptime = state.start_time.elapsed().as_secs();

    let load = match (store.all_questions().await, store.topics().await) {
        (Ok(questions), Ok(topics)) => Some((
            topic_rows(&questions, &topics),
            questions.len(),
            topics.len(),
        )),
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("[DASHBOARD] {}", e);
            None
        }
    };
    let months = store.months().await.unwrap_or_default();

    let (stats_html, rows_html) = match load {
        Some((rows, question_count, topic_count)) => (
            format!(
                r#"<div class="stats">
                <div class="stat"><span class="val">{}</span><span class="lbl">Questions</span></div>
                <div class="stat green"><span class="val">{}</span><span class="lbl">Topics</span></div>
                <div class="stat yellow"><span class="val">{}</span><span class="lbl">Months</span></div>
            </div>"#,
                question_count,
                topic_count,
                months.len()
            ),
            rows,
        ),
        None => (
            "<p class=\"error\">Question data could not be read. Check the service logs.</p>"
                .to_string(),
            String::new(),
        ),
    };
    let rows_html = if rows_html.is_empty() {
        "<tr><td colspan=\"2\">No topics.</td></tr>".to_string()
    } else {
        rows_html
    };

    let month_chips: String = months
        .iter()
        .map(|m| format!("<span class=\"chip mono\">{}</span>\n", escape_html(m)))
        .collect();

    let loaded_line = match store.loaded_at() {
        Some(at) => format!(" &middot; Loaded: {}", escape_html(at)),
        None => String::new(),
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Quiz Bank Dashboard</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0f1117; color: #e0e0e0; padding: 20px; }}
  h1 {{ color: #58a6ff; margin-bottom: 8px; }}
  .meta {{ color: #8b949e; font-size: 0.85em; margin-bottom: 20px; }}
  .stats {{ display: flex; gap: 16px; margin-bottom: 24px; flex-wrap: wrap; }}
  .stat {{ background: #161b22; border: 1px solid #30363d; border-radius: 8px; padding: 16px 24px; text-align: center; min-width: 140px; }}
  .stat .val {{ display: block; font-size: 2em; font-weight: bold; color: #58a6ff; }}
  .stat.green .val {{ color: #3fb950; }}
  .stat.yellow .val {{ color: #d29922; }}
  .stat .lbl {{ display: block; font-size: 0.85em; color: #8b949e; margin-top: 4px; }}
  .error {{ color: #f85149; margin-bottom: 24px; }}
  table {{ width: 100%; border-collapse: collapse; margin-bottom: 24px; }}
  th {{ background: #161b22; color: #8b949e; text-align: left; padding: 8px 12px; font-size: 0.85em; text-transform: uppercase; border-bottom: 1px solid #30363d; }}
  td {{ padding: 8px 12px; border-bottom: 1px solid #21262d; font-size: 0.9em; }}
  tr:hover {{ background: #161b22; }}
  .mono {{ font-family: 'SF Mono', 'Consolas', monospace; font-size: 0.85em; }}
  h2 {{ color: #c9d1d9; margin-bottom: 12px; font-size: 1.1em; }}
  .section {{ margin-bottom: 28px; }}
  .chip {{ display: inline-block; background: #21262d; border: 1px solid #30363d; color: #8b949e; padding: 4px 10px; border-radius: 12px; font-size: 0.8em; margin: 3px; }}
</style>
</head>
<body>
  <h1>Quiz Bank</h1>
  <p class="meta">Mode: {mode} &middot; Uptime: {uptime_str}{loaded_line}</p>

  {stats_html}

  <div class="section">
    <h2>Topics</h2>
    <table>
      <thead><tr><th>Topic</th><th>Questions</th></tr></thead>
      <tbody>{rows_html}</tbody>
    </table>
  </div>

  <div class="section">
    <h2>Months</h2>
    <div>{month_chips}</div>
  </div>
</body>
</html>"#,
        mode = store.mode(),
        uptime_str = format_uptime(uptime),
        loaded_line = loaded_line,
        stats_html = stats_html,
        rows_html = rows_html,
        month_chips = month_chips,
    );

    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html)
}

/// One table row per listed topic with its question count.
fn topic_rows(questions: &[Question], topics: &[String]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for topic in questions.iter().filter_map(Question::topic) {
        *counts.entry(topic).or_default() += 1;
    }

    topics
        .iter()
        .map(|t| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                escape_html(t),
                counts.get(t.as_str()).copied().unwrap_or(0)
            )
        })
        .collect()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::router;
    use crate::store::tests::{sample_dir, write};
    use crate::store::QuestionStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::time::Instant;
    use tower::ServiceExt;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Science & Tech"), "Science &amp; Tech");
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(125), "2m 5s");
        assert_eq!(format_uptime(3725), "1h 2m 5s");
    }

    #[test]
    fn test_topic_rows_count_questions() {
        let questions: Vec<Question> = serde_json::from_str(
            r#"[{"topic":"Sports"},{"topic":"Economy"},{"topic":"Sports"}]"#,
        )
        .unwrap();
        let topics = vec!["Economy".to_string(), "Politics".to_string(), "Sports".to_string()];
        let rows = topic_rows(&questions, &topics);
        assert!(rows.contains("<tr><td>Economy</td><td>1</td></tr>"));
        assert!(rows.contains("<tr><td>Politics</td><td>0</td></tr>"));
        assert!(rows.contains("<tr><td>Sports</td><td>2</td></tr>"));
    }

    #[tokio::test]
    async fn test_dashboard_renders_escaped_topics() {
        let dir = sample_dir();
        write(dir.path(), "2024-03.json", r#"[{"topic":"<b>Bold</b>","q":"Q3"}]"#);
        let store = QuestionStore::preload(dir.path().to_path_buf(), None)
            .await
            .unwrap();
        let app = router(Arc::new(AppState {
            store,
            start_time: Instant::now(),
        }));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<td>&lt;b&gt;Bold&lt;/b&gt;</td>"));
        assert!(!html.contains("<b>Bold</b>"));
        assert!(html.contains("2024-03"));
        assert!(html.contains("Mode: preload"));
    }
}
