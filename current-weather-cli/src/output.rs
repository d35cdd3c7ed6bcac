use chrono::{DateTime, Utc};
use current_weather::{CurrentWeather, GeneralInfo, Unit};

/// Human-readable report; fields the service did not report are skipped.
pub fn render(weather: &CurrentWeather, unit: Unit) -> String {
    let condition = &weather.condition;
    let general = &weather.general;
    let mut rows: Vec<(&str, String)> = Vec::new();

    if let Some(summary) = summary(condition.group.as_deref(), condition.description.as_deref()) {
        rows.push(("Conditions", summary));
    }

    let t = &condition.temperature;
    if let Some(degree) = t.degree {
        let mut text = format!("{degree:.2} {}", unit.temperature_suffix());
        // Conversions assume the service reported kelvin.
        if let (Unit::Standard, Ok(c), Ok(f)) = (unit, t.to_celsius(), t.to_fahrenheit()) {
            text.push_str(&format!(" ({c:.2} °C / {f:.2} °F)"));
        }
        rows.push(("Temperature", text));
    }
    if let Some(feels_like) = t.feels_like {
        rows.push(("Feels like", format!("{feels_like:.2} {}", unit.temperature_suffix())));
    }
    if let (Some(min), Some(max)) = (t.min, t.max) {
        rows.push(("Min / max", format!("{min:.2} / {max:.2} {}", unit.temperature_suffix())));
    }
    if let Some(humidity) = t.humidity {
        rows.push(("Humidity", format!("{humidity}%")));
    }

    let p = &condition.pressure;
    if let (Some(hpa), Ok(bar)) = (p.main, p.to_bar()) {
        rows.push(("Pressure", format!("{hpa} hPa ({bar:.3} bar)")));
    }

    let w = &condition.wind;
    if let Some(speed) = w.speed {
        let mut text = format!("{speed} {}", unit.speed_suffix());
        if let Some(deg) = w.degree {
            text.push_str(&format!(" from {deg}°"));
        }
        if let Some(gust) = w.gust {
            text.push_str(&format!(", gusts {gust} {}", unit.speed_suffix()));
        }
        rows.push(("Wind", text));
    }

    if let Some(pct) = condition.clouds.percentage {
        let label = if condition.clouds.is_cloudy() {
            "cloudy"
        } else if condition.clouds.has_clouds() {
            "some clouds"
        } else {
            "clear"
        };
        rows.push(("Clouds", format!("{pct}% ({label})")));
    }
    if condition.rain.is_raining() {
        let rain = &condition.rain;
        rows.push(("Rain", volumes(rain.volume_one_hour, rain.volume_three_hours)));
    }
    if condition.snow.is_snowing() {
        let snow = &condition.snow;
        rows.push(("Snow", volumes(snow.volume_one_hour, snow.volume_three_hours)));
    }
    if let Some(visibility) = condition.visibility {
        rows.push(("Visibility", format!("{visibility} m")));
    }

    if let Ok(sunrise) = general.sunrise_at() {
        rows.push(("Sunrise", clock(general, sunrise)));
    }
    if let Ok(sunset) = general.sunset_at() {
        rows.push(("Sunset", clock(general, sunset)));
    }
    if let Ok(observed) = general.observed_at() {
        rows.push(("Observed", observed.format("%Y-%m-%d %H:%M UTC").to_string()));
    }

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = format!("{}\n", heading(weather));
    for (label, value) in rows {
        out.push_str(&format!("  {label:<width$}  {value}\n"));
    }
    out
}

fn heading(weather: &CurrentWeather) -> String {
    let city = &weather.general.city;
    let mut heading = match (city.name.as_deref(), city.country.as_deref()) {
        (Some(name), Some(country)) => format!("{name}, {country}"),
        (Some(name), None) => name.to_string(),
        (None, Some(country)) => country.to_string(),
        (None, None) => "Unknown location".to_string(),
    };

    let coords = &weather.coordinates;
    if let (Some(lat), Some(lon)) = (coords.latitude, coords.longitude) {
        heading.push_str(&format!(" ({lat}, {lon})"));
    }
    heading
}

fn summary(group: Option<&str>, description: Option<&str>) -> Option<String> {
    match (group, description) {
        (Some(group), Some(description)) => Some(format!("{group}: {description}")),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    }
}

fn volumes(one_hour: Option<f64>, three_hours: Option<f64>) -> String {
    let parts: Vec<String> = [(one_hour, "1h"), (three_hours, "3h")]
        .into_iter()
        .filter_map(|(volume, span)| volume.map(|v| format!("{v} mm/{span}")))
        .collect();
    parts.join(", ")
}

// Local time when the shift is known, UTC otherwise.
fn clock(general: &GeneralInfo, at: DateTime<Utc>) -> String {
    match general.utc_offset() {
        Ok(offset) => at.with_timezone(&offset).format("%H:%M (UTC%:z)").to_string(),
        Err(_) => at.format("%H:%M UTC").to_string(),
    }
}
