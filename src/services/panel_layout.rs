//! Panel packing on the resolved roof area.
//!
//! The roof is treated as a square of side √area. Panels are packed in a
//! grid in either orientation and the orientation fitting more panels wins,
//! portrait on ties.

/// Module dimensions. `width_m` runs along a row in portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    pub width_m: f64,
    pub height_m: f64,
    pub wattage_kw: f64,
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self {
            width_m: 1.134,
            height_m: 2.279,
            wattage_kw: 0.55,
        }
    }
}

impl PanelSpec {
    pub fn area_sqm(&self) -> f64 {
        self.width_m * self.height_m
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSpacing {
    /// Clearance kept free along every roof edge
    pub setback_m: f64,
    /// Gap between consecutive rows
    pub row_spacing_m: f64,
    /// Reported with the plan but not applied when packing
    pub column_spacing_m: f64,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self {
            setback_m: 0.5,
            row_spacing_m: 0.3,
            column_spacing_m: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOrientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayoutPlan {
    /// `None` when nothing fits
    pub orientation: Option<PanelOrientation>,
    pub rows: u32,
    pub columns: u32,
    pub total_panels: u32,
    pub usable_area_sqm: f64,
    pub total_panel_area_sqm: f64,
    pub coverage_pct: f64,
    pub effective_coverage_pct: f64,
    pub layout_width_m: f64,
    pub layout_height_m: f64,
    pub estimated_kwp: f64,
    pub panel: PanelSpec,
    pub spacing: LayoutSpacing,
}

impl PanelLayoutPlan {
    pub fn empty(panel: PanelSpec, spacing: LayoutSpacing) -> Self {
        Self {
            orientation: None,
            rows: 0,
            columns: 0,
            total_panels: 0,
            usable_area_sqm: 0.0,
            total_panel_area_sqm: 0.0,
            coverage_pct: 0.0,
            effective_coverage_pct: 0.0,
            layout_width_m: 0.0,
            layout_height_m: 0.0,
            estimated_kwp: 0.0,
            panel,
            spacing,
        }
    }
}

fn fit(length: f64, pitch: f64) -> u32 {
    // `as` saturates, and the caller guarantees a positive pitch
    (length / pitch).floor() as u32
}

pub fn optimize_layout(
    area_sqm: f64,
    panel: &PanelSpec,
    spacing: &LayoutSpacing,
    tilt_deg: f64,
) -> PanelLayoutPlan {
    let usable_side = area_sqm.max(0.0).sqrt() - 2.0 * spacing.setback_m;
    let row_gap = spacing.row_spacing_m.max(0.0);
    if !(usable_side > 0.0 && panel.width_m > 0.0 && panel.height_m > 0.0) {
        return PanelLayoutPlan::empty(*panel, *spacing);
    }

    let portrait = (
        fit(usable_side, panel.width_m),
        fit(usable_side, panel.height_m + row_gap),
    );
    let landscape = (
        fit(usable_side, panel.height_m),
        fit(usable_side, panel.width_m + row_gap),
    );

    let portrait_total = u64::from(portrait.0) * u64::from(portrait.1);
    let landscape_total = u64::from(landscape.0) * u64::from(landscape.1);

    let (orientation, (columns, rows), along_row, across_row) =
        if portrait_total >= landscape_total {
            (PanelOrientation::Portrait, portrait, panel.width_m, panel.height_m)
        } else {
            (PanelOrientation::Landscape, landscape, panel.height_m, panel.width_m)
        };

    let total_panels = columns.saturating_mul(rows);
    let usable_area_sqm = usable_side * usable_side;
    let total_panel_area_sqm = f64::from(total_panels) * panel.area_sqm();
    let coverage_pct = total_panel_area_sqm / usable_area_sqm * 100.0;

    PanelLayoutPlan {
        orientation: (total_panels > 0).then_some(orientation),
        rows,
        columns,
        total_panels,
        usable_area_sqm,
        total_panel_area_sqm,
        coverage_pct,
        effective_coverage_pct: coverage_pct * tilt_deg.to_radians().cos(),
        layout_width_m: f64::from(columns) * along_row,
        layout_height_m: f64::from(rows) * across_row + f64::from(rows.saturating_sub(1)) * row_gap,
        estimated_kwp: f64::from(total_panels) * panel.wattage_kw,
        panel: *panel,
        spacing: *spacing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_panel_on_100_sqm() {
        let plan = optimize_layout(100.0, &PanelSpec::default(), &LayoutSpacing::default(), 20.0);

        assert_eq!(plan.orientation, Some(PanelOrientation::Portrait));
        assert_eq!((plan.columns, plan.rows, plan.total_panels), (7, 3, 21));
        assert!((plan.usable_area_sqm - 81.0).abs() < 1e-9);
        assert!((plan.layout_width_m - 7.938).abs() < 1e-9);
        assert!((plan.layout_height_m - 7.437).abs() < 1e-9);
        assert!((plan.estimated_kwp - 11.55).abs() < 1e-9);
        assert!((plan.coverage_pct - 67.0).abs() < 0.01, "coverage {}", plan.coverage_pct);
        let cos20 = 20f64.to_radians().cos();
        assert!((plan.effective_coverage_pct - plan.coverage_pct * cos20).abs() < 1e-9);
        assert_eq!(plan.spacing.column_spacing_m, 0.05);
    }

    #[test]
    fn test_landscape_wins_when_it_fits_more() {
        let panel = PanelSpec {
            width_m: 2.0,
            height_m: 1.0,
            wattage_kw: 0.4,
        };
        let spacing = LayoutSpacing {
            setback_m: 0.0,
            row_spacing_m: 0.5,
            column_spacing_m: 0.0,
        };
        let plan = optimize_layout(25.0, &panel, &spacing, 0.0);

        // portrait 2 × 3 = 6, landscape 5 × 2 = 10
        assert_eq!(plan.orientation, Some(PanelOrientation::Landscape));
        assert_eq!((plan.columns, plan.rows, plan.total_panels), (5, 2, 10));
        assert!((plan.layout_width_m - 5.0).abs() < 1e-12);
        assert!((plan.layout_height_m - 4.5).abs() < 1e-12);
        assert!((plan.effective_coverage_pct - plan.coverage_pct).abs() < 1e-12);
    }

    #[test]
    fn test_zero_layout_when_setback_consumes_roof() {
        let spacing = LayoutSpacing::default();
        for area in [0.0, 0.5, 1.0] {
            let plan = optimize_layout(area, &PanelSpec::default(), &spacing, 20.0);
            assert_eq!(plan, PanelLayoutPlan::empty(PanelSpec::default(), spacing));
        }
    }

    #[test]
    fn test_nothing_fits_has_no_negative_height() {
        // 2 m usable side, too short for a portrait column or landscape row
        let plan = optimize_layout(9.0, &PanelSpec::default(), &LayoutSpacing::default(), 20.0);
        assert_eq!(plan.total_panels, 0);
        assert_eq!(plan.orientation, None);
        assert!(plan.layout_height_m >= 0.0);
        assert!((plan.usable_area_sqm - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_panel_is_zero_layout() {
        let panel = PanelSpec {
            width_m: 0.0,
            ..PanelSpec::default()
        };
        let plan = optimize_layout(100.0, &panel, &LayoutSpacing::default(), 20.0);
        assert_eq!(plan.total_panels, 0);
    }

    #[test]
    fn test_best_orientation_dominates() {
        let panel = PanelSpec::default();
        let spacing = LayoutSpacing::default();
        for i in 1..400 {
            let area = f64::from(i) * 1.7;
            let plan = optimize_layout(area, &panel, &spacing, 15.0);
            assert_eq!(plan.total_panels, plan.rows * plan.columns);

            let s = area.sqrt() - 2.0 * spacing.setback_m;
            if s <= 0.0 {
                assert_eq!(plan.total_panels, 0);
                continue;
            }
            let p = fit(s, panel.width_m) * fit(s, panel.height_m + spacing.row_spacing_m);
            let l = fit(s, panel.height_m) * fit(s, panel.width_m + spacing.row_spacing_m);
            assert!(plan.total_panels >= p && plan.total_panels >= l, "area {area}");
        }
    }
}
