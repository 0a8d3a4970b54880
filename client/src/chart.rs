use leptos::prelude::*;

use statemap_shared::legend::{self, GradientStop};
use statemap_shared::{
    ColorScale, Dataset, KeyMode, Rgb, ScaleMode, StateDatum, StatesGeometry, Topology,
};

use crate::resize;
use crate::tooltip::{ChartTooltip, HoverInfo};

/// Default low→high palette, the original heatmap ramp.
pub const DEFAULT_SCALE_COLORS: &[&str] = &["#228b22", "#ffd500", "#7f0000"];
pub const DEFAULT_NO_ENTRY_COLOR: Rgb = Rgb(0xc9, 0xc9, 0xc9);

/// The topology dataset is pre-projected to a 960x600 frame; the map group
/// is scaled from this reference resolution to the measured width.
const MAP_RESOLUTION: f64 = 1000.0;
/// Height/width ratio of the map area.
const MAP_ASPECT: f64 = 0.618;
/// Vertical band below the map reserved for the legend.
const LEGEND_BAND: f64 = 80.0;
const LEGEND_BAR_HEIGHT: f64 = 25.0;
const LEGEND_WIDTH_FRACTION: f64 = 0.9;
const LEGEND_TICK_TARGET: usize = 10;
const FALLBACK_WIDTH: f64 = 960.0;

/// Payload of the click/hover/mouseout output events: the display key of
/// the state under the cursor (per the active key mode) and its value.
/// Both are absent for boundary features outside the reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEvent {
    pub state_name: Option<String>,
    pub value: Option<f64>,
}

/// Everything one redraw needs, rebuilt from scratch whenever any input
/// changes. No incremental patching: the dataset is at most ~60 regions,
/// so a full rebuild is cheap and keeps the mapping logic in one place.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Frame {
    pub width: f64,
    pub height: f64,
    pub view_box: String,
    pub map_scale: f64,
    pub regions: Vec<RegionView>,
    pub mesh: String,
    pub legend: LegendFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegionView {
    pub path: String,
    pub fill: String,
    pub state_name: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LegendFrame {
    pub stops: Vec<(f64, String)>,
    pub band_width: f64,
    /// Tick x offset (px within the band) and label.
    pub ticks: Vec<(f64, String)>,
}

pub(crate) struct FrameInput<'a> {
    pub geometry: &'a StatesGeometry,
    pub records: &'a [StateDatum],
    pub colors: &'a [Rgb],
    pub key_mode: KeyMode,
    pub scale_mode: ScaleMode,
    pub no_entry_color: Rgb,
    pub width: f64,
}

pub(crate) fn build_frame(input: FrameInput<'_>) -> Frame {
    let width = if input.width > 0.0 {
        input.width
    } else {
        FALLBACK_WIDTH
    };
    let height = width * MAP_ASPECT;
    let dataset = Dataset::from_records(input.records, input.key_mode);
    let (min, max) = dataset.domain().unwrap_or((0.0, 0.0));
    let scale = ColorScale::for_mode(input.scale_mode, (min, max), input.colors.to_vec());

    let regions = input
        .geometry
        .features
        .iter()
        .map(|feature| {
            let resolved = feature
                .id
                .map(|id| dataset.resolve(id))
                .unwrap_or_else(|| statemap_shared::ResolvedState {
                    state_name: None,
                    value: None,
                });
            let fill = match (&scale, resolved.value) {
                (Some(scale), Some(v)) => scale.color_at(v),
                _ => input.no_entry_color,
            };
            RegionView {
                path: feature.path.clone(),
                fill: fill.css(),
                state_name: resolved.state_name,
                value: resolved.value,
            }
        })
        .collect();

    Frame {
        width,
        height,
        view_box: format!("0 0 {width} {}", height + LEGEND_BAND),
        map_scale: width / MAP_RESOLUTION,
        regions,
        mesh: input.geometry.mesh.clone(),
        legend: build_legend(scale.as_ref(), (min, max), width),
    }
}

fn build_legend(scale: Option<&ColorScale>, domain: (f64, f64), width: f64) -> LegendFrame {
    let band_width = width * LEGEND_WIDTH_FRACTION;
    let Some(scale) = scale else {
        return LegendFrame {
            stops: Vec::new(),
            band_width,
            ticks: Vec::new(),
        };
    };

    let stops = legend::gradient_stops(scale)
        .into_iter()
        .map(|GradientStop { offset, color }| (offset, color.css()))
        .collect();

    let (min, max) = domain;
    let tick_values = match scale {
        ColorScale::Threshold { boundaries, .. } => {
            // Bucket edges are the meaningful marks for a threshold scale.
            let mut values = Vec::with_capacity(boundaries.len() + 2);
            values.push(min);
            values.extend_from_slice(boundaries);
            values.push(max);
            values.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON);
            values
        }
        ColorScale::Linear { .. } => legend::ticks(min, max, LEGEND_TICK_TARGET),
    };

    let span = max - min;
    let ticks = tick_values
        .into_iter()
        .map(|value| {
            let t = if span > 0.0 { (value - min) / span } else { 0.0 };
            (t * band_width, legend::tick_label(value))
        })
        .collect();

    LegendFrame {
        stops,
        band_width,
        ticks,
    }
}

/// Measured width of the chart container, falling back to the window
/// width before first layout.
fn container_width(chart_id: &str) -> f64 {
    let document = web_sys::window().and_then(|w| w.document());
    let measured = document
        .and_then(|d| d.get_element_by_id(chart_id))
        .map(|el| el.get_bounding_client_rect().width())
        .filter(|w| *w > 0.0);
    if let Some(w) = measured {
        return w;
    }
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .filter(|w| *w > 0.0)
        .unwrap_or(FALLBACK_WIDTH)
}

async fn fetch_topology(url: String) -> Result<StatesGeometry, String> {
    let resp = gloo_net::http::Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let text = resp
        .text()
        .await
        .map_err(|e| format!("read error: {e}"))?;
    let topology = Topology::from_json(&text).map_err(|e| format!("decode error: {e}"))?;
    topology
        .decode_states()
        .map_err(|e| format!("decode error: {e}"))
}

/// Choropleth map of US states.
///
/// Renders an SVG map colored by the caller's dataset, with a gradient (or
/// bucketed) legend underneath and a cursor tooltip. Redraws fully on any
/// input change and on debounced window resizes; emits click/hover/mouseout
/// events carrying the resolved state and value.
#[component]
pub fn UsColormap(
    /// DOM id of the chart container; also namespaces the legend gradient.
    #[prop(default = "united-states")]
    chart_id: &'static str,
    #[prop(into)] data: Signal<Vec<StateDatum>>,
    /// Low→high palette; needs at least two colors, otherwise every region
    /// renders the no-entry color.
    #[prop(into)]
    scale_colors: Signal<Vec<Rgb>>,
    #[prop(default = DEFAULT_NO_ENTRY_COLOR)] no_entry_color: Rgb,
    /// Match records by postal code or by full state name.
    #[prop(into)]
    key_mode: Signal<KeyMode>,
    #[prop(into)] scale_mode: Signal<ScaleMode>,
    /// Where to fetch the pre-projected TopoJSON boundary dataset.
    #[prop(default = "/assets/states-10m.json")]
    topology_url: &'static str,
    #[prop(optional, into)] tooltip_text: Option<Callback<(String, Option<f64>), String>>,
    #[prop(optional, into)] on_state_clicked: Option<Callback<StateEvent>>,
    #[prop(optional, into)] on_state_hovered: Option<Callback<StateEvent>>,
    #[prop(optional, into)] on_state_mouseout: Option<Callback<StateEvent>>,
) -> impl IntoView {
    let geometry: RwSignal<Option<StatesGeometry>> = RwSignal::new(None);
    let redraw: RwSignal<u64> = RwSignal::new(0);
    let hovered: RwSignal<Option<HoverInfo>> = RwSignal::new(None);
    let mouse_pos: RwSignal<(f64, f64)> = RwSignal::new((0.0, 0.0));

    resize::install(redraw);

    // One-shot topology fetch on mount.
    Effect::new(move || {
        let url = topology_url.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            match fetch_topology(url).await {
                Ok(geo) => geometry.set(Some(geo)),
                Err(e) => {
                    web_sys::console::warn_1(&format!("Topology fetch failed: {e}").into());
                }
            }
        });
    });

    // The container div isn't laid out during the first render pass; bump
    // the generation once mounted so the width measurement sees real layout.
    Effect::new(move || {
        redraw.update(|generation| *generation = generation.wrapping_add(1));
    });

    let frame = Memo::new(move |_| {
        redraw.track();
        let geometry = geometry.get()?;
        Some(build_frame(FrameInput {
            geometry: &geometry,
            records: &data.get(),
            colors: &scale_colors.get(),
            key_mode: key_mode.get(),
            scale_mode: scale_mode.get(),
            no_entry_color,
            width: container_width(chart_id),
        }))
    });

    let gradient_id = format!("{chart_id}-gradient");

    view! {
        <div id=chart_id style="width: 100%;">
            {move || {
                let Some(frame) = frame.get() else {
                    return ().into_any();
                };
                let gradient_id = gradient_id.clone();
                let gradient_ref = format!("url(#{gradient_id})");

                let regions = frame
                    .regions
                    .iter()
                    .map(|region| {
                        let event = StateEvent {
                            state_name: region.state_name.clone(),
                            value: region.value,
                        };
                        let click_event = event.clone();
                        let hover_event = event.clone();
                        let out_event = event;
                        let hover_info = region.state_name.clone().map(|state_name| HoverInfo {
                            state_name,
                            value: region.value,
                        });
                        view! {
                            <path
                                class="state"
                                d=region.path.clone()
                                fill=region.fill.clone()
                                on:click=move |_| {
                                    if let Some(cb) = on_state_clicked {
                                        cb.run(click_event.clone());
                                    }
                                }
                                on:mouseover=move |_| {
                                    hovered.set(hover_info.clone());
                                    if let Some(cb) = on_state_hovered {
                                        cb.run(hover_event.clone());
                                    }
                                }
                                on:mouseout=move |_| {
                                    hovered.set(None);
                                    if let Some(cb) = on_state_mouseout {
                                        cb.run(out_event.clone());
                                    }
                                }
                            />
                        }
                    })
                    .collect_view();

                let stops = frame
                    .legend
                    .stops
                    .iter()
                    .map(|(offset, color)| {
                        view! { <stop offset=offset.to_string() stop-color=color.clone() /> }
                    })
                    .collect_view();

                let ticks = frame
                    .legend
                    .ticks
                    .iter()
                    .map(|(x, label)| {
                        let x = format!("{x:.1}");
                        view! {
                            <line x1=x.clone() y1="0" x2=x.clone() y2="6" stroke="#333" />
                            <text
                                x=x
                                y="20"
                                text-anchor="middle"
                                font-size="12"
                                fill="#333"
                            >
                                {label.clone()}
                            </text>
                        }
                    })
                    .collect_view();

                view! {
                    <svg
                        width=frame.width.to_string()
                        height=(frame.height + LEGEND_BAND).to_string()
                        viewBox=frame.view_box.clone()
                        preserveAspectRatio="xMinYMid"
                        on:mousemove=move |ev| {
                            mouse_pos.set((ev.client_x() as f64, ev.client_y() as f64));
                        }
                    >
                        <g class="colormap-g" transform=format!("scale({:.4})", frame.map_scale)>
                            <g class="state-container">{regions}</g>
                            <path
                                class="state-borders"
                                d=frame.mesh.clone()
                                fill="none"
                                stroke="#fff"
                                stroke-width="1"
                                stroke-linejoin="round"
                            />
                        </g>
                        <g class="legend" transform=format!("translate(5, {})", frame.height)>
                            <defs>
                                <linearGradient
                                    id=gradient_id
                                    x1="0%"
                                    y1="100%"
                                    x2="100%"
                                    y2="100%"
                                >
                                    {stops}
                                </linearGradient>
                            </defs>
                            <rect
                                width=frame.legend.band_width.to_string()
                                height=LEGEND_BAR_HEIGHT.to_string()
                                transform="translate(0, 25)"
                                fill=gradient_ref
                            />
                            <g class="axis" transform="translate(0, 50)">
                                <line
                                    x1="0"
                                    y1="0"
                                    x2=frame.legend.band_width.to_string()
                                    y2="0"
                                    stroke="#333"
                                />
                                {ticks}
                            </g>
                        </g>
                    </svg>
                }
                .into_any()
            }}
        </div>
        <ChartTooltip hovered=hovered mouse_pos=mouse_pos formatter=tooltip_text />
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statemap_shared::StateFeature;

    fn geometry() -> StatesGeometry {
        StatesGeometry {
            features: vec![
                StateFeature { id: Some(12), path: "M0,0L1,0L1,1Z".into() }, // FL
                StateFeature { id: Some(6), path: "M2,0L3,0L3,1Z".into() },  // CA
                StateFeature { id: Some(48), path: "M4,0L5,0L5,1Z".into() }, // TX
                StateFeature { id: None, path: "M6,0L7,0L7,1Z".into() },
            ],
            mesh: "M1,0L1,1".into(),
        }
    }

    fn frame_for(records: &[StateDatum], key_mode: KeyMode) -> Frame {
        build_frame(FrameInput {
            geometry: &geometry(),
            records,
            colors: &[Rgb(0, 0, 0), Rgb(255, 255, 255)],
            key_mode,
            scale_mode: ScaleMode::Linear,
            no_entry_color: DEFAULT_NO_ENTRY_COLOR,
            width: 1000.0,
        })
    }

    #[test]
    fn matched_regions_span_the_scale_and_rest_fall_back() {
        let records = vec![
            StateDatum::by_code("FL", 3.0),
            StateDatum::by_code("CA", 1.0),
        ];
        let frame = frame_for(&records, KeyMode::Code);
        // Domain [1, 3]: FL at the high end, CA at the low end.
        assert_eq!(frame.regions[0].fill, "#ffffff");
        assert_eq!(frame.regions[1].fill, "#000000");
        assert_eq!(frame.regions[2].fill, "#c9c9c9");
        assert_eq!(frame.regions[3].fill, "#c9c9c9");
    }

    #[test]
    fn unknown_feature_carries_no_event_payload() {
        let frame = frame_for(&[StateDatum::by_code("FL", 3.0)], KeyMode::Code);
        assert_eq!(frame.regions[3].state_name, None);
        assert_eq!(frame.regions[3].value, None);
    }

    #[test]
    fn key_mode_switch_produces_identical_fills() {
        let records = vec![
            StateDatum::full("FL", "Florida", 3.0),
            StateDatum::full("CA", "California", 1.0),
        ];
        let by_code = frame_for(&records, KeyMode::Code);
        let by_name = frame_for(&records, KeyMode::Name);
        let fills = |f: &Frame| f.regions.iter().map(|r| r.fill.clone()).collect::<Vec<_>>();
        assert_eq!(fills(&by_code), fills(&by_name));
    }

    #[test]
    fn layout_follows_the_measured_width() {
        let frame = frame_for(&[StateDatum::by_code("FL", 3.0)], KeyMode::Code);
        assert_eq!(frame.height, 618.0);
        assert_eq!(frame.view_box, "0 0 1000 698");
        assert_eq!(frame.map_scale, 1.0);
        assert_eq!(frame.legend.band_width, 900.0);
    }

    #[test]
    fn non_positive_width_falls_back() {
        let frame = build_frame(FrameInput {
            geometry: &geometry(),
            records: &[],
            colors: &[Rgb(0, 0, 0), Rgb(255, 255, 255)],
            key_mode: KeyMode::Code,
            scale_mode: ScaleMode::Linear,
            no_entry_color: DEFAULT_NO_ENTRY_COLOR,
            width: 0.0,
        });
        assert_eq!(frame.width, 960.0);
    }

    #[test]
    fn too_few_colors_renders_everything_as_no_data() {
        let frame = build_frame(FrameInput {
            geometry: &geometry(),
            records: &[StateDatum::by_code("FL", 3.0)],
            colors: &[Rgb(1, 2, 3)],
            key_mode: KeyMode::Code,
            scale_mode: ScaleMode::Linear,
            no_entry_color: DEFAULT_NO_ENTRY_COLOR,
            width: 1000.0,
        });
        assert!(frame.regions.iter().all(|r| r.fill == "#c9c9c9"));
        assert!(frame.legend.stops.is_empty());
        assert!(frame.legend.ticks.is_empty());
    }

    #[test]
    fn malformed_values_render_as_no_data() {
        let records = vec![
            StateDatum::by_code("FL", "n/a"),
            StateDatum::by_code("CA", 1.0),
        ];
        let frame = frame_for(&records, KeyMode::Code);
        assert_eq!(frame.regions[0].fill, "#c9c9c9");
        // CA is the only value: degenerate domain maps to the low color.
        assert_eq!(frame.regions[1].fill, "#000000");
    }

    #[test]
    fn legend_ticks_stay_inside_the_band() {
        let records = vec![
            StateDatum::by_code("CA", 1.0),
            StateDatum::by_code("TX", 43.0),
        ];
        let frame = frame_for(&records, KeyMode::Code);
        assert!(!frame.legend.ticks.is_empty());
        for (x, _) in &frame.legend.ticks {
            assert!((0.0..=frame.legend.band_width).contains(x), "tick at {x}");
        }
    }

    #[test]
    fn threshold_mode_marks_bucket_edges() {
        let records = vec![
            StateDatum::by_code("CA", 0.0),
            StateDatum::by_code("TX", 30.0),
        ];
        let frame = build_frame(FrameInput {
            geometry: &geometry(),
            records: &records,
            colors: &[Rgb(1, 1, 1), Rgb(2, 2, 2), Rgb(3, 3, 3)],
            key_mode: KeyMode::Code,
            scale_mode: ScaleMode::Threshold,
            no_entry_color: DEFAULT_NO_ENTRY_COLOR,
            width: 1000.0,
        });
        let labels: Vec<&str> = frame
            .legend
            .ticks
            .iter()
            .map(|(_, label)| label.as_str())
            .collect();
        assert_eq!(labels, ["0", "10", "20", "30"]);
        // Hard-edged bands: doubled stops.
        assert_eq!(frame.legend.stops.len(), 6);
    }

    #[test]
    fn empty_dataset_renders_fallback_everywhere() {
        let frame = frame_for(&[], KeyMode::Code);
        assert!(frame.regions.iter().all(|r| r.fill == "#c9c9c9"));
    }
}
