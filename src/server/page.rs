//! Embedded HTML for the prediction form

use std::fmt::Write;

use crate::schema::{FeatureSchema, UiMetadata};

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn numeric_field(out: &mut String, name: &str, metadata: &UiMetadata) {
    let (value, step) = match metadata.numeric_default(name) {
        Some(d) if d.is_int => (format!("{}", d.median.round() as i64), "1"),
        Some(d) => (format!("{}", d.median), "any"),
        None => (String::new(), "any"),
    };
    let name = escape(name);
    let _ = write!(
        out,
        r#"<label>{name}<input type="number" name="{name}" value="{value}" step="{step}" required></label>"#
    );
}

fn categorical_field(out: &mut String, name: &str, metadata: &UiMetadata) {
    let escaped = escape(name);
    match metadata.dropdown(name) {
        Some(values) => {
            let _ = write!(out, r#"<label>{escaped}<select name="{escaped}">"#);
            for value in values {
                let value = escape(value);
                let _ = write!(out, r#"<option value="{value}">{value}</option>"#);
            }
            out.push_str("</select></label>");
        }
        None => {
            let _ = write!(
                out,
                r#"<label>{escaped}<input type="text" name="{escaped}" required></label>"#
            );
        }
    }
}

/// Render the index page: one field per feature plus the batch upload form
pub fn render_index(schema: &FeatureSchema, metadata: &UiMetadata) -> String {
    let mut fields = String::new();
    for name in schema.num_cols() {
        numeric_field(&mut fields, name, metadata);
    }
    for name in schema.cat_cols() {
        categorical_field(&mut fields, name, metadata);
    }

    INDEX_TEMPLATE
        .replace("{{FEATURE_COUNT}}", &schema.len().to_string())
        .replace("{{FIELDS}}", &fields)
}

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Laptop Price Predictor</title>
    <style>
        body{font-family:system-ui,sans-serif;max-width:56rem;margin:2rem auto;padding:0 1rem;color:#1f2937}
        form.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(16rem,1fr));gap:.75rem}
        label{display:flex;flex-direction:column;font-size:.875rem;gap:.25rem}
        input,select{padding:.4rem;border:1px solid #d1d5db;border-radius:.25rem}
        button{margin-top:1rem;padding:.5rem 1.5rem;background:#2563eb;color:#fff;border:0;border-radius:.25rem;cursor:pointer}
        #result{margin-top:1rem;font-size:1.25rem;font-weight:600}
        .error{color:#b91c1c}
    </style>
</head>
<body>
    <h1>Laptop Price Predictor</h1>
    <section>
        <h2>Single prediction <small>({{FEATURE_COUNT}} features)</small></h2>
        <form id="predict-form" class="grid">
            {{FIELDS}}
            <div><button type="submit">Predict</button></div>
        </form>
        <div id="result"></div>
    </section>
    <section>
        <h2>Batch prediction</h2>
        <form action="/batch_predict" method="post" enctype="multipart/form-data">
            <input type="file" name="file" accept=".csv">
            <button type="submit">Upload CSV</button>
        </form>
    </section>
    <script>
        document.getElementById('predict-form').addEventListener('submit', async (e) => {
            e.preventDefault();
            const out = document.getElementById('result');
            const body = new URLSearchParams(new FormData(e.target));
            const res = await fetch('/predict', {method: 'POST', body});
            const data = await res.json();
            if (data.success) {
                out.className = '';
                out.textContent = 'Predicted price: ₹' + data.prediction.toLocaleString('en-IN');
            } else {
                out.className = 'error';
                out.textContent = data.error;
            }
        });
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NumericDefault;

    fn metadata() -> UiMetadata {
        let mut metadata = UiMetadata::default();
        metadata
            .dropdowns
            .insert("Brand".to_string(), vec!["HP".to_string(), "Dell & Co".to_string()]);
        metadata.numeric_defaults.insert(
            "RAM_GB".to_string(),
            NumericDefault { median: 8.0, is_int: true },
        );
        metadata.numeric_defaults.insert(
            "Screen_Size".to_string(),
            NumericDefault { median: 14.5, is_int: false },
        );
        metadata
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_render_fields() {
        let schema = FeatureSchema::new(
            vec!["RAM_GB".into(), "Screen_Size".into()],
            vec!["Brand".into(), "OS".into()],
        )
        .unwrap();
        let html = render_index(&schema, &metadata());

        assert!(html.contains(r#"name="RAM_GB" value="8" step="1""#));
        assert!(html.contains(r#"name="Screen_Size" value="14.5" step="any""#));
        assert!(html.contains(r#"<option value="HP">HP</option><option value="Dell &amp; Co">"#));
        assert!(html.contains(r#"<input type="text" name="OS" required>"#));
        assert!(html.contains("(4 features)"));
    }
}
