pub mod prompt;
pub mod select;

use prompt::Prompt;
use select::select_masks;

use lazy_static::lazy_static;
use ndarray::{Array1, Array2, Array3, Array4};
use ort::{inputs, CUDAExecutionProvider, GraphOptimizationLevel, Session};

use image::{DynamicImage, GenericImageView, GrayImage, RgbImage};
use tracing::debug;

use crate::error::{ClickSamError, Result};

const INPUT_W: u32 = 1024;
const INPUT_H: u32 = 684;

lazy_static! {
    static ref MASK: Array4<f32> = Array4::<f32>::default((1, 1, 256, 256));
    static ref HAS_MASK_INPUT: Array1<f32> = Array1::from(vec![0.0f32]);
    static ref ORIG_SIZE: Array1<f32> = Array1::from(vec![INPUT_H as f32, INPUT_W as f32]);
}

/// One segmentation session: both ONNX sessions plus the embedding cached by
/// the last `set_image` call. Owned by the compute thread, never shared.
#[derive(Debug)]
pub struct SamModel {
    encoder: Session,
    decoder: Session,

    embedding: Option<Array4<f32>>,
    ori_w: u32,
    ori_h: u32,
}

// public
impl SamModel {
    pub fn new(encoder_path: &str, decoder_path: &str) -> Result<Self> {
        Ok(Self {
            encoder: Self::session(encoder_path)?,
            decoder: Self::session(decoder_path)?,
            embedding: None,
            ori_w: 0,
            ori_h: 0,
        })
    }

    /// Compute and cache the embedding for `img`. Every later `predict` runs
    /// against this embedding until the next call.
    pub fn set_image(&mut self, img: &DynamicImage) -> Result<()> {
        let (input, w, h) = Self::preprocess_img(img);
        self.ori_w = w;
        self.ori_h = h;

        let encoder_input = inputs!(&self.encoder.inputs[0].name => input.view())?;
        let mut encoder_output = self.encoder.run(encoder_input)?;
        self.embedding = Some(
            encoder_output
                .remove("image_embeddings")
                .ok_or_else(|| ClickSamError::ModelUnavailable("encoder output missing".into()))?
                .try_extract_tensor::<f32>()?
                .to_shape((1, 256, 64, 64))?
                .to_owned(),
        );

        Ok(())
    }

    /// Run the decoder against the cached embedding. Returns the candidate
    /// masks `(N, H, W)` and their IoU scores `(N,)`; the low-res logits
    /// output is not consumed.
    pub fn predict(&self, prompt: &Prompt) -> Result<(Array3<f32>, Array1<f32>)> {
        let emb = self.embedding.as_ref().ok_or(ClickSamError::NoEmbedding)?;
        let (points, labels) = self.preprocess_prompt(prompt);

        let decoder_input = inputs!(
            &self.decoder.inputs[0].name => emb.view(),
            &self.decoder.inputs[1].name => points.view(),
            &self.decoder.inputs[2].name => labels.view(),
            &self.decoder.inputs[3].name => MASK.view(),
            &self.decoder.inputs[4].name => HAS_MASK_INPUT.view(),
            &self.decoder.inputs[5].name => ORIG_SIZE.view(),
        )?;
        let decoder_output = self.decoder.run(decoder_input)?;

        let masks = decoder_output["masks"].try_extract_tensor::<f32>()?;
        let n = masks.shape()[1];
        let masks = masks
            .to_shape((n, INPUT_H as usize, INPUT_W as usize))?
            .to_owned();

        let scores = decoder_output["iou_predictions"]
            .try_extract_tensor::<f32>()?
            .to_shape(n)?
            .to_owned();

        Ok((masks, scores))
    }

    /// Single-click segmentation: expand the click into the two-point prompt,
    /// decode, pick one candidate, and threshold it into a {0, 255} RGB mask
    /// at the original image size. Returns the mask and the winner's score.
    pub fn segment(&self, x: u32, y: u32) -> Result<(RgbImage, f32)> {
        let prompt = Prompt::click(x, y);
        let (masks, scores) = self.predict(&prompt)?;

        let (mask, score) = select_masks(masks.view(), scores.view(), prompt.num_points());
        debug!(score, shape = ?mask.shape(), "selected mask");

        Ok((self.postprocess(&mask), score))
    }
}

// private
impl SamModel {
    fn session(path: &str) -> Result<Session> {
        Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| {
                b.with_execution_providers([CUDAExecutionProvider::default()
                    .build()
                    .error_on_failure()])
            })
            .and_then(|b| b.with_intra_threads(4))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|err| ClickSamError::ModelUnavailable(format!("{path}: {err}")))
    }

    fn preprocess_img(img: &DynamicImage) -> (Array3<f32>, u32, u32) {
        let (ori_w, ori_h) = img.dimensions();
        let img = img.resize_exact(INPUT_W, INPUT_H, image::imageops::FilterType::CatmullRom);

        // the encoder wants BGR channel order
        let mut arr = Array3::zeros((INPUT_H as usize, INPUT_W as usize, 3));
        for pixel in img.pixels() {
            let x = pixel.0 as _;
            let y = pixel.1 as _;
            let [r, g, b, _] = pixel.2 .0;

            arr[[y, x, 2]] = r as f32;
            arr[[y, x, 1]] = g as f32;
            arr[[y, x, 0]] = b as f32;
        }

        (arr, ori_w, ori_h)
    }

    /// Scale click coordinates from original-image pixels into the decoder's
    /// fixed input resolution.
    fn preprocess_prompt(&self, prompt: &Prompt) -> (Array3<f32>, Array2<f32>) {
        let points: Vec<f32> = prompt
            .points()
            .iter()
            .flat_map(|[x, y]| {
                let x = *x as f32 * INPUT_W as f32 / self.ori_w as f32;
                let y = *y as f32 * INPUT_H as f32 / self.ori_h as f32;
                [x, y]
            })
            .collect();
        let labels = prompt.labels().to_vec();

        let n = labels.len();
        let points = Array3::from_shape_vec((1, n, 2), points).expect("two values per point");
        let labels = Array2::from_shape_vec((1, n), labels).expect("one label per point");

        (points, labels)
    }

    fn postprocess(&self, mask: &Array2<f32>) -> RgbImage {
        let mask = mask.mapv(|v| if v > 0.0f32 { 255u8 } else { 0u8 });
        let mask: Vec<u8> = mask.into_raw_vec_and_offset().0;
        let mask =
            GrayImage::from_raw(INPUT_W, INPUT_H, mask).expect("mask plane is decoder-sized");

        // nearest keeps the mask strictly {0, 255}
        DynamicImage::ImageLuma8(mask)
            .resize_exact(self.ori_w, self.ori_h, image::imageops::FilterType::Nearest)
            .to_rgb8()
    }
}
