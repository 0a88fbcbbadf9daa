/// Decoder point labels.
pub const LABEL_FOREGROUND: f32 = 1.0;
pub const LABEL_PADDING: f32 = -1.0;

/// A set of point prompts in original-image pixel coordinates. Labels run
/// parallel to the points and only take the values above.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    points: Vec<[u32; 2]>,
    labels: Vec<f32>,
}

impl Prompt {
    /// Expand a single click into the fixed two-point pair the decoder is
    /// queried with: the clicked pixel labeled foreground plus the (0, 0)
    /// placeholder labeled as padding.
    pub fn click(x: u32, y: u32) -> Self {
        Prompt {
            points: vec![[x, y], [0, 0]],
            labels: vec![LABEL_FOREGROUND, LABEL_PADDING],
        }
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[[u32; 2]] {
        &self.points
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }
}
