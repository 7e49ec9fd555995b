use minijinja::{context, Environment};
use serde::Serialize;

use crate::error::Result;
use crate::features::FEATURE_NAMES;

const INDEX: &str = "index.html";
const INDEX_SOURCE: &str = include_str!("../../templates/index.html");

#[derive(Debug, Clone, Serialize)]
struct FieldView {
    name: &'static str,
    label: &'static str,
}

fn field_label(name: &str) -> &'static str {
    match name {
        "fixed_acidity" => "Fixed Acidity",
        "volatile_acidity" => "Volatile Acidity",
        "citric_acid" => "Citric Acid",
        "residual_sugar" => "Residual Sugar",
        "chlorides" => "Chlorides",
        "free_sulfur_dioxide" => "Free Sulfur Dioxide",
        "total_sulfur_dioxide" => "Total Sulfur Dioxide",
        "density" => "Density",
        "pH" => "pH",
        "sulphates" => "Sulphates",
        "alcohol" => "Alcohol",
        _ => "",
    }
}

/// Compiled page templates. `.html` templates are auto-escaped.
pub struct Templates {
    env: Environment<'static>,
    fields: Vec<FieldView>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(INDEX, INDEX_SOURCE)?;
        let fields = FEATURE_NAMES
            .into_iter()
            .map(|name| FieldView {
                name,
                label: field_label(name),
            })
            .collect();
        Ok(Self { env, fields })
    }

    /// Render the form page, with the result line only when `results` is set.
    pub fn render_index(&self, results: Option<&str>) -> Result<String> {
        let tmpl = self.env.get_template(INDEX)?;
        Ok(tmpl.render(context! {
            fields => &self.fields,
            results => results,
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_has_all_fields_and_no_results() {
        let html = Templates::new().unwrap().render_index(None).unwrap();
        for name in FEATURE_NAMES {
            assert!(html.contains(&format!("name=\"{name}\"")), "missing input {name}");
        }
        assert!(!html.contains("id=\"results\""));
    }

    #[test]
    fn results_are_rendered_and_escaped() {
        let templates = Templates::new().unwrap();
        let html = templates.render_index(Some("Good Quality Wine")).unwrap();
        assert!(html.contains("<div class=\"results\" id=\"results\">Good Quality Wine</div>"));

        let html = templates.render_index(Some("<b>x</b>")).unwrap();
        assert!(html.contains("&lt;b&gt;x&lt;&#x2f;b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
