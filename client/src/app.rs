use gloo_storage::Storage;
use leptos::prelude::*;

use statemap_shared::{Dataset, KeyMode, Rgb, ScaleMode, StateDatum};

use crate::chart::{DEFAULT_NO_ENTRY_COLOR, DEFAULT_SCALE_COLORS, StateEvent, UsColormap};

const SETTINGS_KEY: &str = "statemap_demo_settings";
const EVENT_LOG_MAX: usize = 8;

/// Named palettes selectable in the demo, low→high.
const PALETTES: &[(&str, &[&str])] = &[
    ("Heat", DEFAULT_SCALE_COLORS),
    ("Blues", &["#f7fbff", "#6baed6", "#08306b"]),
    ("Purple-Orange", &["#5e3c99", "#f7f7f7", "#e66101"]),
    ("Two-tone", &["#e5f5e0", "#00441b"]),
];

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct DemoSettings {
    palette: usize,
    key_mode: KeyMode,
    scale_mode: ScaleMode,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            palette: 0,
            key_mode: KeyMode::Name,
            scale_mode: ScaleMode::Linear,
        }
    }
}

/// The original demo dataset, plus one malformed record to show how
/// invalid values surface.
fn sample_data() -> Vec<StateDatum> {
    vec![
        StateDatum::full("FL", "Florida", "2"),
        StateDatum::full("OR", "Oregon", 0.0),
        StateDatum::full("TN", "Tennessee", "9"),
        StateDatum::full("TX", "Texas", 43.0),
        StateDatum::full("WA", "Washington", "n/a"),
    ]
}

fn palette_colors(index: usize) -> Vec<Rgb> {
    let (_, hexes) = PALETTES.get(index).unwrap_or(&PALETTES[0]);
    hexes
        .iter()
        .map(|hex| Rgb::parse(hex).unwrap_or(DEFAULT_NO_ENTRY_COLOR))
        .collect()
}

/// One line of the demo's event log.
fn format_event(kind: &str, event: &StateEvent) -> String {
    let name = event.state_name.as_deref().unwrap_or("(unknown)");
    match event.value {
        Some(v) => format!("{kind}: {name} = {v}"),
        None => format!("{kind}: {name}, no data"),
    }
}

fn push_event(log: RwSignal<Vec<String>>, kind: &'static str, event: &StateEvent) {
    let line = format_event(kind, event);
    log.update(|lines| {
        lines.insert(0, line);
        lines.truncate(EVENT_LOG_MAX);
    });
}

/// Demo application embedding the colormap with live controls.
#[component]
pub fn App() -> impl IntoView {
    let saved: DemoSettings = gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default();

    let data: RwSignal<Vec<StateDatum>> = RwSignal::new(sample_data());
    let data_text: RwSignal<String> =
        RwSignal::new(serde_json::to_string_pretty(&sample_data()).unwrap_or_default());
    let parse_error: RwSignal<Option<String>> = RwSignal::new(None);
    let palette: RwSignal<usize> = RwSignal::new(saved.palette.min(PALETTES.len() - 1));
    let key_mode: RwSignal<KeyMode> = RwSignal::new(saved.key_mode);
    let scale_mode: RwSignal<ScaleMode> = RwSignal::new(saved.scale_mode);
    let events: RwSignal<Vec<String>> = RwSignal::new(Vec::new());

    // Persist control state across reloads.
    Effect::new(move || {
        let settings = DemoSettings {
            palette: palette.get(),
            key_mode: key_mode.get(),
            scale_mode: scale_mode.get(),
        };
        let _ = gloo_storage::LocalStorage::set(SETTINGS_KEY, &settings);
    });

    let scale_colors = Signal::derive(move || palette_colors(palette.get()));
    let invalid_keys = Memo::new(move |_| {
        Dataset::from_records(&data.get(), key_mode.get())
            .invalid_keys()
            .to_vec()
    });

    let apply_data = move |_| {
        match serde_json::from_str::<Vec<StateDatum>>(&data_text.get_untracked()) {
            Ok(records) => {
                parse_error.set(None);
                data.set(records);
            }
            Err(e) => parse_error.set(Some(format!("invalid dataset JSON: {e}"))),
        }
    };

    let tooltip_text = Callback::new(|(state_name, value): (String, Option<f64>)| match value {
        Some(v) => format!("{state_name} \u{2014} {v}"),
        None => format!("{state_name} \u{2014} no entry"),
    });

    view! {
        <div style="max-width: 1100px; margin: 0 auto; padding: 16px; font-family: system-ui, sans-serif; color: #24292f;">
            <h1 style="font-size: 1.3rem;">"US state colormap"</h1>
            <div style="display: flex; gap: 16px; flex-wrap: wrap; align-items: center; margin-bottom: 12px;">
                <label>
                    "Palette "
                    <select on:change=move |ev| {
                        if let Ok(idx) = event_target_value(&ev).parse::<usize>() {
                            palette.set(idx.min(PALETTES.len() - 1));
                        }
                    }>
                        {PALETTES
                            .iter()
                            .enumerate()
                            .map(|(idx, (label, _))| {
                                view! {
                                    <option
                                        value=idx.to_string()
                                        selected=move || palette.get() == idx
                                    >
                                        {*label}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </label>
                <label>
                    <input
                        type="checkbox"
                        prop:checked=move || key_mode.get() == KeyMode::Code
                        on:change=move |_| {
                            key_mode.update(|mode| {
                                *mode = match mode {
                                    KeyMode::Code => KeyMode::Name,
                                    KeyMode::Name => KeyMode::Code,
                                };
                            });
                        }
                    />
                    " match by postal code"
                </label>
                <label>
                    <input
                        type="checkbox"
                        prop:checked=move || scale_mode.get() == ScaleMode::Threshold
                        on:change=move |_| {
                            scale_mode.update(|mode| {
                                *mode = match mode {
                                    ScaleMode::Linear => ScaleMode::Threshold,
                                    ScaleMode::Threshold => ScaleMode::Linear,
                                };
                            });
                        }
                    />
                    " bucketed scale"
                </label>
            </div>

            <UsColormap
                data=data
                scale_colors=scale_colors
                key_mode=key_mode
                scale_mode=scale_mode
                tooltip_text=tooltip_text
                on_state_clicked=Callback::new(move |e: StateEvent| push_event(events, "clicked", &e))
                on_state_hovered=Callback::new(move |e: StateEvent| push_event(events, "hovered", &e))
                on_state_mouseout=Callback::new(move |e: StateEvent| push_event(events, "mouseout", &e))
            />

            {move || {
                let invalid = invalid_keys.get();
                (!invalid.is_empty())
                    .then(|| {
                        view! {
                            <p style="color: #9a3412; font-size: 0.85rem;">
                                "Records with non-numeric values (rendered as no data): "
                                {invalid.join(", ")}
                            </p>
                        }
                    })
            }}

            <div style="display: flex; gap: 24px; flex-wrap: wrap; margin-top: 16px;">
                <div style="flex: 1; min-width: 320px;">
                    <h2 style="font-size: 1rem;">"Dataset"</h2>
                    <textarea
                        rows="14"
                        style="width: 100%; font-family: monospace; font-size: 0.8rem;"
                        prop:value=move || data_text.get()
                        on:input=move |ev| data_text.set(event_target_value(&ev))
                    />
                    <div style="display: flex; gap: 12px; align-items: center;">
                        <button on:click=apply_data>"Apply"</button>
                        {move || {
                            parse_error
                                .get()
                                .map(|e| {
                                    view! {
                                        <span style="color: #b91c1c; font-size: 0.8rem;">{e}</span>
                                    }
                                })
                        }}
                    </div>
                </div>
                <div style="flex: 1; min-width: 240px;">
                    <h2 style="font-size: 1rem;">"Events"</h2>
                    <ul style="font-family: monospace; font-size: 0.8rem; list-style: none; padding: 0;">
                        {move || {
                            events
                                .get()
                                .into_iter()
                                .map(|line| view! { <li>{line}</li> })
                                .collect_view()
                        }}
                    </ul>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_data_parses_except_the_malformed_record() {
        let ds = Dataset::from_records(&sample_data(), KeyMode::Name);
        assert_eq!(ds.domain(), Some((0.0, 43.0)));
        assert_eq!(ds.invalid_keys(), ["Washington".to_string()]);
    }

    #[test]
    fn every_palette_parses() {
        for (idx, (label, hexes)) in PALETTES.iter().enumerate() {
            let colors = palette_colors(idx);
            assert_eq!(colors.len(), hexes.len(), "palette {label}");
            assert!(colors.len() >= 2, "palette {label} needs two colors");
        }
    }

    #[test]
    fn out_of_range_palette_falls_back_to_default() {
        assert_eq!(palette_colors(999), palette_colors(0));
    }

    #[test]
    fn event_lines_cover_data_and_no_data() {
        let with_value = StateEvent {
            state_name: Some("Texas".into()),
            value: Some(43.0),
        };
        assert_eq!(format_event("clicked", &with_value), "clicked: Texas = 43");

        let no_value = StateEvent {
            state_name: Some("Guam".into()),
            value: None,
        };
        assert_eq!(format_event("hovered", &no_value), "hovered: Guam, no data");

        let unknown = StateEvent {
            state_name: None,
            value: None,
        };
        assert_eq!(
            format_event("mouseout", &unknown),
            "mouseout: (unknown), no data"
        );
    }
}
