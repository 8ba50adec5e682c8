//! Compositing operators

crate::named_enum! {
    /// Per-pixel operator combining the source with the destination
    ///
    /// Porter-Duff operators first, then the blend modes.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum CompositeOp {
        Clear => "clear",
        Source => "source",
        #[default]
        SourceOver => "source-over",
        SourceIn => "source-in",
        SourceOut => "source-out",
        SourceAtop => "source-atop",
        Destination => "destination",
        DestinationOver => "destination-over",
        DestinationIn => "destination-in",
        DestinationOut => "destination-out",
        DestinationAtop => "destination-atop",
        Xor => "xor",
        Darken => "darken",
        Lighten => "lighten",
        Overlay => "overlay",
        Screen => "screen",
        Multiply => "multiply",
        Plus => "plus",
        Minus => "minus",
        Exclusion => "exclusion",
        Difference => "difference",
        SoftLight => "soft-light",
        HardLight => "hard-light",
        ColorBurn => "color-burn",
        ColorDodge => "color-dodge",
        Contrast => "contrast",
        Invert => "invert",
        InvertBlend => "invert-blend",
        Hue => "hue",
        Saturation => "saturation",
        Color => "color",
        Luminosity => "luminosity",
    }
}

impl CompositeOp {
    /// Porter-Duff operator (as opposed to a blend mode)
    pub fn is_porter_duff(self) -> bool {
        (self as u8) <= CompositeOp::Xor as u8
    }

    /// Non-separable blend mode, computed on the whole color
    pub fn is_non_separable(self) -> bool {
        matches!(
            self,
            CompositeOp::Hue | CompositeOp::Saturation | CompositeOp::Color | CompositeOp::Luminosity
        )
    }
}
