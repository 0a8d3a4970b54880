use leptos::prelude::*;

/// What the tooltip shows for the hovered region.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub state_name: String,
    pub value: Option<f64>,
}

/// Default tooltip line when the host supplies no formatter.
pub(crate) fn default_tooltip_text(state_name: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{state_name}: {}", format_value(v)),
        None => format!("{state_name}: no data"),
    }
}

/// Integers render without a decimal point.
pub(crate) fn format_value(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v}")
    }
}

/// Tooltip that follows the mouse cursor while a state is hovered.
#[component]
pub fn ChartTooltip(
    hovered: RwSignal<Option<HoverInfo>>,
    mouse_pos: RwSignal<(f64, f64)>,
    #[prop(optional_no_strip)] formatter: Option<Callback<(String, Option<f64>), String>>,
) -> impl IntoView {
    view! {
        {move || {
            let Some(info) = hovered.get() else {
                return view! { <div style="display:none;" /> }.into_any();
            };
            let (x, y) = mouse_pos.get();
            let text = match formatter {
                Some(cb) => cb.run((info.state_name.clone(), info.value)),
                None => default_tooltip_text(&info.state_name, info.value),
            };
            view! {
                <div
                    style:left=format!("{}px", x + 16.0)
                    style:top=format!("{}px", y - 8.0)
                    style="position: fixed; pointer-events: none; z-index: 100; background: #161921; color: #e2e0d8; border: 1px solid #282c3e; border-radius: 6px; padding: 6px 10px; font-size: 0.8rem; font-family: system-ui, sans-serif; box-shadow: 0 4px 16px rgba(0,0,0,0.4);"
                >
                    {text}
                </div>
            }
            .into_any()
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::{default_tooltip_text, format_value};

    #[test]
    fn integer_values_render_without_decimals() {
        assert_eq!(format_value(43.0), "43");
        assert_eq!(format_value(0.0), "0");
    }

    #[test]
    fn fractional_values_keep_their_digits() {
        assert_eq!(format_value(2.5), "2.5");
    }

    #[test]
    fn default_text_covers_data_and_no_data() {
        assert_eq!(default_tooltip_text("Florida", Some(3.0)), "Florida: 3");
        assert_eq!(default_tooltip_text("Guam", None), "Guam: no data");
    }
}
