pub(crate) const FORM_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>MBA Admission Predictor</title>
</head>
<body>
  <h1>MBA Admission Predictor</h1>
  <form action="/predict" method="post">
    <label>Gender <input name="gender" required></label><br>
    <label>International <input name="international" required></label><br>
    <label>Major <input name="major" required></label><br>
    <label>Race <input name="race" required></label><br>
    <label>Work industry <input name="work_industry" required></label><br>
    <label>GPA <input name="gpa" type="number" step="0.01" required></label><br>
    <label>GMAT <input name="gmat" type="number" step="1" required></label><br>
    <label>Work experience (years) <input name="work_exp" type="number" step="1" required></label><br>
    <button type="submit">Predict</button>
  </form>
</body>
</html>"#;

pub(crate) const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Internal Server Error</title>
</head>
<body>
  <h1>Internal Server Error</h1>
  <p>The server encountered an internal error and was unable to complete your request.</p>
</body>
</html>"#;

pub(crate) fn render_result(label: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Prediction Result</title>
</head>
<body>
  <h1>Prediction Result</h1>
  <p>Predicted admission outcome: <strong>{}</strong></p>
  <a href="/">Try another applicant</a>
</body>
</html>"#,
        escape_html(label)
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_page_escapes_labels() {
        let page = render_result("<Admit & \"Waitlist\">");
        assert!(page.contains("&lt;Admit &amp; &quot;Waitlist&quot;&gt;"));
        assert!(!page.contains("<Admit"));
    }
}
