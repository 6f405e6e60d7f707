//! HTML rendering of the prediction form.

use std::fmt::Write;

use crate::types::{limits, PropertyType, RawInputs, Region};

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; }
aside { width: 18rem; padding: 1.5rem; background: #f0f2f6; min-height: 100vh; }
main { flex: 1; padding: 1.5rem 3rem; max-width: 60rem; }
.grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; }
label { display: block; font-size: 0.9rem; margin-bottom: 0.75rem; }
input, select { width: 100%; padding: 0.3rem; }
.result { font-size: 1.4rem; font-weight: bold; }
footer { margin-top: 2rem; border-top: 1px solid #ccc; color: #555; }
"#;

/// Which half of the submit cycle is being shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Idle,
    Submitted { predicted_price: f32 },
}

pub fn render_page(inputs: &RawInputs, view: View) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>House Price Prediction App</title>\n");
    let _ = writeln!(html, "<style>{}</style>\n</head>\n<body>", STYLE);

    html.push_str(SIDEBAR);
    html.push_str("<main>\n<h1>🏠 House Price Prediction App</h1>\n");
    html.push_str(INTRO);

    html.push_str("<h2>Enter House Details</h2>\n<form method=\"post\" action=\"/\">\n<div class=\"grid\">\n");

    html.push_str("<div>\n");
    int_input(&mut html, "rooms", "Number of Rooms", inputs.rooms as u64, Some(limits::ROOMS),
        "Enter the number of rooms in the house.");
    int_input(&mut html, "postcode", "Postcode", inputs.postcode as u64, Some(limits::POSTCODE),
        "Enter the postcode of the house.");
    int_input(&mut html, "bedroom2", "Number of Bedrooms (2nd)", inputs.bedroom2 as u64,
        Some(limits::BEDROOM2), "Enter the number of second bedrooms.");
    float_input(&mut html, "latitude", "Latitude", inputs.latitude, limits::LATITUDE,
        "Enter the latitude of the house.");
    int_input(&mut html, "landsize", "Landsize (in square meters)", inputs.landsize, None,
        "Enter the land size of the property.");
    html.push_str("</div>\n<div>\n");
    int_input(&mut html, "distance", "Distance to CBD (km)", inputs.distance as u64,
        Some(limits::DISTANCE), "Enter the distance of the house from the city center.");
    int_input(&mut html, "bathroom", "Number of Bathrooms", inputs.bathroom as u64,
        Some(limits::BATHROOM), "Enter the number of bathrooms.");
    float_input(&mut html, "longitude", "Longitude", inputs.longitude, limits::LONGITUDE,
        "Enter the longitude of the house.");
    html.push_str("</div>\n<div>\n");
    select(
        &mut html,
        "property_type",
        "Property Type",
        PropertyType::ALL.iter().map(|t| (t.label(), *t == inputs.property_type)),
        "Select whether the property is a house (Type_t) or a unit (Type_u).",
    );
    select(
        &mut html,
        "region",
        "Region",
        Region::ALL.iter().map(|r| (r.label(), *r == inputs.region)),
        "Select the region of the property.",
    );
    html.push_str("</div>\n</div>\n");
    html.push_str("<button type=\"submit\">Predict House Price</button>\n</form>\n");

    render_echo(&mut html, inputs);

    if let View::Submitted { predicted_price } = view {
        let _ = writeln!(
            html,
            "<p class=\"result\">The predicted house price is: {}</p>",
            format_price(predicted_price)
        );
        html.push_str(
            "<p>Note: This prediction is based on the model's training with historical data, \
             and actual house prices may vary.</p>\n",
        );
    }

    html.push_str(FOOTER);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// Minimal page shown when a submission cannot be answered.
pub fn render_error(message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\">\
         <title>House Price Prediction App</title></head>\n<body>\n\
         <h1>Something went wrong</h1>\n<p>{}</p>\n<p><a href=\"/\">Back to the form</a></p>\n\
         </body>\n</html>\n",
        escape(message)
    )
}

fn render_echo(html: &mut String, i: &RawInputs) {
    html.push_str("<h3>You have entered the following details:</h3>\n<ul>\n");
    let _ = writeln!(html, "<li>Rooms: {}</li>", i.rooms);
    let _ = writeln!(html, "<li>Distance: {} km</li>", i.distance);
    let _ = writeln!(html, "<li>Postcode: {}</li>", i.postcode);
    let _ = writeln!(html, "<li>Bedrooms (2nd): {}</li>", i.bedroom2);
    let _ = writeln!(html, "<li>Bathrooms: {}</li>", i.bathroom);
    let _ = writeln!(html, "<li>Latitude: {}</li>", i.latitude);
    let _ = writeln!(html, "<li>Longitude: {}</li>", i.longitude);
    let _ = writeln!(html, "<li>Landsize: {} square meters</li>", i.landsize);
    let _ = writeln!(html, "<li>Property Type: {}</li>", i.property_type);
    let _ = writeln!(html, "<li>Region: {}</li>", i.region);
    html.push_str("</ul>\n");
}

fn int_input(html: &mut String, name: &str, label: &str, value: u64, bounds: Option<(u32, u32)>, help: &str) {
    let range = match bounds {
        Some((min, max)) => format!(" min=\"{}\" max=\"{}\"", min, max),
        None => " min=\"0\"".to_string(),
    };
    let _ = writeln!(
        html,
        "<label title=\"{help}\">{label}<input type=\"number\" name=\"{name}\" value=\"{value}\"{range} step=\"1\" required></label>"
    );
}

fn float_input(html: &mut String, name: &str, label: &str, value: f64, (min, max): (f64, f64), help: &str) {
    let _ = writeln!(
        html,
        "<label title=\"{help}\">{label}<input type=\"number\" name=\"{name}\" value=\"{value}\" min=\"{min}\" max=\"{max}\" step=\"any\" required></label>"
    );
}

fn select<'a>(
    html: &mut String,
    name: &str,
    label: &str,
    options: impl Iterator<Item = (&'a str, bool)>,
    help: &str,
) {
    let _ = write!(html, "<label title=\"{help}\">{label}<select name=\"{name}\">");
    for (opt, selected) in options {
        let sel = if selected { " selected" } else { "" };
        let _ = write!(html, "<option value=\"{opt}\"{sel}>{opt}</option>");
    }
    html.push_str("</select></label>\n");
}

/// `$1,234,567.89`
pub fn format_price(price: f32) -> String {
    let cents = (price as f64 * 100.0).round();
    let negative = cents < 0.0;
    let cents = cents.abs() as u64;
    let (whole, frac) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", if negative { "-" } else { "" }, grouped, frac)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

const INTRO: &str = "<p>This web application predicts house prices based on the features provided by the user. \
The prediction model was trained using XGBoost, and the features include the number of rooms, \
distance to the CBD, postcode, number of bedrooms, bathrooms, latitude, longitude, land size, \
property type, and region.</p>\n";

const SIDEBAR: &str = "<aside>\n<h2>About</h2>\n\
<p>This model predicts house prices based on several input features. \
The model was trained using data from Melbourne's housing market. \
The prediction is based on the following features:</p>\n<ul>\n\
<li>Number of rooms</li>\n<li>Distance to the city center (CBD)</li>\n<li>Postcode</li>\n\
<li>Number of bedrooms</li>\n<li>Number of bathrooms</li>\n<li>Latitude and Longitude</li>\n\
<li>Property type (House/Unit)</li>\n\
<li>Region (Southern Metropolitan/Northern Metropolitan)</li>\n\
<li>Land size (in square meters)</li>\n</ul>\n</aside>\n";

const FOOTER: &str = "<footer>\n<ul>\n<li>Model: XGBoost</li>\n\
<li>Data Source: Melbourne Housing Data</li>\n</ul>\n</footer>\n";
