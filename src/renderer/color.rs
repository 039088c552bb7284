use serde::Deserialize;

/// Selects which color palette to use for field rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMap {
    /// Perceptually uniform purple -> teal -> yellow.
    #[default]
    Viridis,
    /// Black -> purple -> orange -> pale yellow.
    Inferno,
    /// Indigo -> magenta -> yellow.
    Plasma,
    /// Colour-vision-deficiency friendly navy -> grey -> yellow.
    Cividis,
    /// Diverging blue -> light grey -> red, for signed data.
    Coolwarm,
    /// White -> black.
    Greys,
}

pub(crate) const VIRIDIS_STOPS: [(f64, f64, f64); 9] = [
    (68.0, 1.0, 84.0),    // #440154
    (71.0, 45.0, 123.0),  // #472d7b
    (59.0, 82.0, 139.0),  // #3b528b
    (44.0, 114.0, 142.0), // #2c728e
    (33.0, 145.0, 140.0), // #21918c
    (40.0, 174.0, 128.0), // #28ae80
    (94.0, 201.0, 98.0),  // #5ec962
    (173.0, 220.0, 48.0), // #addc30
    (253.0, 231.0, 37.0), // #fde725
];

pub(crate) const INFERNO_STOPS: [(f64, f64, f64); 9] = [
    (0.0, 0.0, 4.0),       // #000004
    (31.0, 12.0, 72.0),    // #1f0c48
    (85.0, 15.0, 109.0),   // #550f6d
    (136.0, 34.0, 106.0),  // #88226a
    (186.0, 54.0, 85.0),   // #ba3655
    (227.0, 89.0, 51.0),   // #e35933
    (249.0, 142.0, 9.0),   // #f98e09
    (246.0, 215.0, 70.0),  // #f6d746
    (252.0, 255.0, 164.0), // #fcffa4
];

pub(crate) const PLASMA_STOPS: [(f64, f64, f64); 9] = [
    (13.0, 8.0, 135.0),   // #0d0887
    (76.0, 2.0, 161.0),   // #4c02a1
    (126.0, 3.0, 168.0),  // #7e03a8
    (169.0, 35.0, 149.0), // #a92395
    (204.0, 71.0, 120.0), // #cc4778
    (229.0, 107.0, 93.0), // #e56b5d
    (248.0, 149.0, 64.0), // #f89540
    (253.0, 195.0, 40.0), // #fdc328
    (240.0, 249.0, 33.0), // #f0f921
];

pub(crate) const CIVIDIS_STOPS: [(f64, f64, f64); 9] = [
    (0.0, 34.0, 78.0),     // #00224e
    (18.0, 53.0, 112.0),   // #123570
    (59.0, 73.0, 108.0),   // #3b496c
    (87.0, 93.0, 109.0),   // #575d6d
    (112.0, 113.0, 115.0), // #707173
    (138.0, 134.0, 120.0), // #8a8678
    (165.0, 156.0, 116.0), // #a59c74
    (195.0, 179.0, 105.0), // #c3b369
    (254.0, 232.0, 56.0),  // #fee838
];

pub(crate) const COOLWARM_STOPS: [(f64, f64, f64); 5] = [
    (59.0, 76.0, 192.0),   // cool blue   (0.00)
    (144.0, 178.0, 254.0), // light blue  (0.25)
    (221.0, 220.0, 220.0), // light grey  (0.50)
    (245.0, 156.0, 125.0), // salmon      (0.75)
    (180.0, 4.0, 38.0),    // warm red    (1.00)
];

pub(crate) const GREYS_STOPS: [(f64, f64, f64); 2] = [(255.0, 255.0, 255.0), (0.0, 0.0, 0.0)];

impl ColorMap {
    fn stops(self) -> &'static [(f64, f64, f64)] {
        match self {
            ColorMap::Viridis => &VIRIDIS_STOPS,
            ColorMap::Inferno => &INFERNO_STOPS,
            ColorMap::Plasma => &PLASMA_STOPS,
            ColorMap::Cividis => &CIVIDIS_STOPS,
            ColorMap::Coolwarm => &COOLWARM_STOPS,
            ColorMap::Greys => &GREYS_STOPS,
        }
    }
}

/// Convert a [0.0, 1.0] value to RGBA using the specified color map.
pub fn map_to_rgba(t: f64, colormap: ColorMap) -> [u8; 4] {
    let stops = colormap.stops();
    let segments = stops.len() - 1;

    let t = t.clamp(0.0, 1.0);
    let seg = t * segments as f64;
    let i = (seg as usize).min(segments - 1);
    let s = seg - i as f64;

    let (r0, g0, b0) = stops[i];
    let (r1, g1, b1) = stops[i + 1];

    [
        (r0 + s * (r1 - r0)) as u8,
        (g0 + s * (g1 - g0)) as u8,
        (b0 + s * (b1 - b0)) as u8,
        255,
    ]
}

/// A colormap with an optional reversal, as applied to normalized values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    pub map: ColorMap,
    pub reversed: bool,
}

impl Palette {
    pub fn new(map: ColorMap, reversed: bool) -> Self {
        Self { map, reversed }
    }

    /// RGB for a normalized value; `None` for NaN (left unpainted).
    pub fn rgb(&self, t: f64) -> Option<[u8; 3]> {
        if t.is_nan() {
            return None;
        }
        let t = if self.reversed { 1.0 - t } else { t };
        let [r, g, b, _] = map_to_rgba(t, self.map);
        Some([r, g, b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(map_to_rgba(0.0, ColorMap::Viridis), [68, 1, 84, 255]);
        assert_eq!(map_to_rgba(1.0, ColorMap::Viridis), [253, 231, 37, 255]);
        assert_eq!(map_to_rgba(0.5, ColorMap::Viridis), [33, 145, 140, 255]);
    }

    #[test]
    fn test_color_clamp() {
        for cmap in [ColorMap::Inferno, ColorMap::Greys] {
            assert_eq!(map_to_rgba(-1.0, cmap), map_to_rgba(0.0, cmap));
            assert_eq!(map_to_rgba(2.0, cmap), map_to_rgba(1.0, cmap));
        }
    }

    #[test]
    fn test_greys_runs_white_to_black() {
        assert_eq!(map_to_rgba(0.0, ColorMap::Greys), [255, 255, 255, 255]);
        assert_eq!(map_to_rgba(1.0, ColorMap::Greys), [0, 0, 0, 255]);
    }

    #[test]
    fn test_reversed_palette_swaps_ends() {
        let fwd = Palette::new(ColorMap::Cividis, false);
        let rev = Palette::new(ColorMap::Cividis, true);
        assert_eq!(fwd.rgb(0.0), rev.rgb(1.0));
        assert_eq!(fwd.rgb(1.0), rev.rgb(0.0));
        assert_eq!(rev.rgb(f64::NAN), None);
    }

    #[test]
    fn test_gradient_continuity() {
        for cmap in [
            ColorMap::Viridis,
            ColorMap::Inferno,
            ColorMap::Plasma,
            ColorMap::Cividis,
            ColorMap::Coolwarm,
            ColorMap::Greys,
        ] {
            let mut prev = map_to_rgba(0.0, cmap);
            for i in 1..=200 {
                let cur = map_to_rgba(i as f64 / 200.0, cmap);
                for ch in 0..3 {
                    let diff = (cur[ch] as i32 - prev[ch] as i32).abs();
                    assert!(diff <= 12, "{cmap:?} jumps by {diff} at step {i}");
                }
                prev = cur;
            }
        }
    }
}
