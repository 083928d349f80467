/// Splits a 0xRRGGBB colour into linear-ish float channels.
pub const fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocketPalette {
    pub name: &'static str,
    pub upper: [f32; 3],
    pub lower: [f32; 3],
    pub nose: [f32; 3],
    pub fire: [f32; 3],
}

pub const PALETTES: [RocketPalette; 5] = [
    RocketPalette {
        name: "Classic",
        upper: hex_rgb(0x888888),
        lower: hex_rgb(0x777777),
        nose: hex_rgb(0x999999),
        fire: hex_rgb(0xff4400),
    },
    RocketPalette {
        name: "Crimson",
        upper: hex_rgb(0xb22222),
        lower: hex_rgb(0x8b1a1a),
        nose: hex_rgb(0xeeeeee),
        fire: hex_rgb(0xffaa00),
    },
    RocketPalette {
        name: "Cobalt",
        upper: hex_rgb(0x2255cc),
        lower: hex_rgb(0x1a3f99),
        nose: hex_rgb(0xdddddd),
        fire: hex_rgb(0x44ccff),
    },
    RocketPalette {
        name: "Emerald",
        upper: hex_rgb(0x22aa66),
        lower: hex_rgb(0x1a804d),
        nose: hex_rgb(0xf0f0f0),
        fire: hex_rgb(0x88ff44),
    },
    RocketPalette {
        name: "Gold",
        upper: hex_rgb(0xd4af37),
        lower: hex_rgb(0xa8892c),
        nose: hex_rgb(0x333333),
        fire: hex_rgb(0xff6600),
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaletteChoice {
    index: usize,
}

impl PaletteChoice {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'static RocketPalette {
        &PALETTES[self.index]
    }

    pub fn next(&mut self) -> &'static RocketPalette {
        self.index = (self.index + 1) % PALETTES.len();
        self.current()
    }

    /// Out of range indices leave the choice alone.
    pub fn select(&mut self, index: usize) -> bool {
        if index < PALETTES.len() && index != self.index {
            self.index = index;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_channels() {
        assert_eq!(hex_rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_rgb(0x0000ff), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn cycling_wraps_around() {
        let mut choice = PaletteChoice::default();
        for _ in 0..PALETTES.len() {
            choice.next();
        }
        assert_eq!(choice.index(), 0);
        assert_eq!(choice.current().name, "Classic");
    }

    #[test]
    fn select_ignores_out_of_range() {
        let mut choice = PaletteChoice::default();
        assert!(choice.select(3));
        assert_eq!(choice.current().name, "Emerald");
        assert!(!choice.select(9));
        assert_eq!(choice.index(), 3);
    }
}
