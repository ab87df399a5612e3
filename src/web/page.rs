use crate::core::regions::RegionCatalog;
use crate::types::{FIRST_YEAR, LAST_YEAR};
use crate::web::render::{escape_html, PanelSet};

/// Slider positions of the form
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub region: String,
    pub years: [i32; 3],
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            region: RegionCatalog::default_region().label.to_string(),
            years: [2019, 2021, 2023],
        }
    }
}

fn region_options(selected: &str) -> String {
    RegionCatalog::labels()
        .map(|label| {
            let attr = if label == selected { " selected" } else { "" };
            let label = escape_html(label);
            format!("<option value=\"{label}\"{attr}>{label}</option>")
        })
        .collect::<Vec<_>>()
        .join("\n                ")
}

fn year_slider(index: usize, value: i32) -> String {
    let n = index + 1;
    format!(
        r#"<label for="year{n}">Год {n}: <output id="year{n}-value">{value}</output></label>
            <input type="range" id="year{n}" name="year{n}" min="{FIRST_YEAR}" max="{LAST_YEAR}" step="1" value="{value}"
                   oninput="document.getElementById('year{n}-value').value = this.value">"#
    )
}

/// The whole application page: controls, status line and map panels
pub fn index_page(form: &FormState, result: Option<&PanelSet>) -> String {
    let sliders: Vec<String> = form
        .years
        .iter()
        .enumerate()
        .map(|(i, year)| year_slider(i, *year))
        .collect();

    let status = result
        .map(|r| format!("<div class=\"status\">{}</div>", escape_html(&r.status)))
        .unwrap_or_default();

    let panels: String = result
        .map(|r| {
            r.panels
                .iter()
                .map(|panel| format!("<div class=\"panel\">{}</div>", panel.as_deref().unwrap_or("")))
                .collect()
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Анализ почвенного покрова</title>
    <style>
        body {{ font-family: sans-serif; margin: 0 auto; padding: 16px 24px; }}
        form {{ display: flex; flex-direction: column; gap: 10px; max-width: 420px; }}
        .status {{ margin: 16px 0; }}
        .maps {{ display: flex; gap: 12px; }}
        .panel {{ flex: 1; min-width: 0; }}
    </style>
</head>
<body>
    <h1>🛰️ Анализ почвенного покрова</h1>
    <p>Выберите регион и до трёх лет для анализа. Карты будут показаны слева направо (от более раннего года к более позднему).</p>
    <form method="post" action="/">
        <label for="region">Регион</label>
        <select id="region" name="region">
                {options}
        </select>
        {sliders}
        <button type="submit">Сгенерировать карты</button>
    </form>
    {status}
    <div class="maps">{panels}</div>
</body>
</html>
"#,
        options = region_options(&form.region),
        sliders = sliders.join("\n        "),
        status = status,
        panels = panels,
    )
}
