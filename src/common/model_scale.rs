use serde::{Deserialize, Serialize};

/// Backbone/neck scaling variants. Each tag fixes a depth gain (number of
/// bottleneck repeats) and a width gain (channel count).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelScale {
    S,
    M,
    #[default]
    L,
    X,
}

/// Output channels of each backbone stage after width scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackboneChannels {
    pub stage1: usize,
    pub stage2: usize,
    pub stage3: usize,
    pub stage4: usize,
    pub stage5: usize,
    pub spp: usize,
    pub csp1: usize,
    pub conv1: usize,
}

const BASE_CHANNELS: BackboneChannels = BackboneChannels {
    stage1: 64,
    stage2: 128,
    stage3: 256,
    stage4: 512,
    stage5: 1024,
    spp: 1024,
    csp1: 1024,
    conv1: 512,
};

impl ModelScale {
    pub fn name(&self) -> String {
        match self {
            Self::S => "s".to_string(),
            Self::M => "m".to_string(),
            Self::L => "l".to_string(),
            Self::X => "x".to_string(),
        }
    }

    pub fn from(version: &str) -> Option<ModelScale> {
        match version.to_lowercase().as_str() {
            "s" => Some(ModelScale::S),
            "m" => Some(ModelScale::M),
            "l" => Some(ModelScale::L),
            "x" => Some(ModelScale::X),
            _ => None,
        }
    }

    /// `(depth_gain, width_gain)`
    pub fn gains(&self) -> (f32, f32) {
        match self {
            Self::S => (0.33, 0.50),
            Self::M => (0.67, 0.75),
            Self::L => (1.0, 1.0),
            Self::X => (1.33, 1.25),
        }
    }

    /// Scaled repeat count. Single blocks are never scaled away.
    pub fn depth(&self, n: usize) -> usize {
        if n > 1 {
            ((n as f32 * self.gains().0).round() as usize).max(1)
        } else {
            n
        }
    }

    /// Scaled channel count, rounded up to a multiple of 8.
    pub fn width(&self, n: usize) -> usize {
        make_divisible(n as f32 * self.gains().1, 8)
    }

    pub fn backbone_channels(&self) -> BackboneChannels {
        let c = BASE_CHANNELS;
        BackboneChannels {
            stage1: self.width(c.stage1),
            stage2: self.width(c.stage2),
            stage3: self.width(c.stage3),
            stage4: self.width(c.stage4),
            stage5: self.width(c.stage5),
            spp: self.width(c.spp),
            csp1: self.width(c.csp1),
            conv1: self.width(c.conv1),
        }
    }
}

pub fn make_divisible(x: f32, divisor: usize) -> usize {
    (x / divisor as f32).ceil() as usize * divisor
}
