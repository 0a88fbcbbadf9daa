mod state;

use super::threads::{Command, Return};
use state::{ResultView, UiState};

use egui::{CentralPanel, ColorImage, Sense, SidePanel, TextureOptions, TopBottomPanel};
use strum::IntoEnumIterator;

use std::sync::mpsc::{Receiver, Sender};

use crate::error::{ClickSamError, Result};

pub struct UiData {
    sender: Sender<Command>,
    receiver: Receiver<Return>,

    state: UiState,
}

impl eframe::App for UiData {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.draw_info_column(ctx);

        self.draw_button_row(ctx);

        self.draw_result_row(ctx);

        self.draw_img_area(ctx);

        if let Ok(ret) = self.receiver.try_recv() {
            match ret {
                Return::Img(img) => {
                    self.state.img = Some(img);
                    self.state.embedded = true;
                    self.state.status = "Image embedded, click to segment".to_string();
                }
                Return::Segmented(res) => {
                    self.state.last_click = Some(res.click);
                    self.state.score = Some(res.score);
                    self.state.boxes = res.boxes;
                    self.state.save_number = Some(res.save_number);
                    self.state.mask = Some(res.mask);
                    self.state.annotated = Some(res.annotated);
                    self.state.status = "Segmented".to_string();
                }
                Return::Failure(msg) => {
                    self.state.status = msg;
                }
                Return::Void => (),
            }
        }

        ctx.request_repaint();
    }
}

// public
impl UiData {
    pub fn new(sender: Sender<Command>, receiver: Receiver<Return>) -> Self {
        UiData {
            sender,
            receiver,

            state: UiState::new(),
        }
    }

    pub fn run(self) -> Result<()> {
        eframe::run_native(
            "click-sam",
            eframe::NativeOptions {
                viewport: egui::ViewportBuilder {
                    position: None,
                    inner_size: Some(egui::vec2(1920.0, 1080.0)),
                    ..Default::default()
                },
                ..Default::default()
            },
            Box::new(move |_cc| Ok(Box::new(self))),
        )
        .map_err(|err| ClickSamError::Ui(err.to_string()))
    }
}

// private
impl UiData {
    fn draw_info_column(&self, ctx: &egui::Context) {
        SidePanel::right("infos").show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.label("Image Info");
                match &self.state.img {
                    Some(img) => {
                        ui.label(format!("Width: {}", img.size[0]));
                        ui.label(format!("Height: {}", img.size[1]));
                    }
                    None => {
                        ui.label("No Image loaded");
                    }
                }

                ui.separator();

                ui.label("Last Click");
                if let Some([x, y]) = self.state.last_click {
                    ui.label(format!("At: {x}, {y}"));
                }
                if let Some(score) = self.state.score {
                    ui.label(format!("Mask score: {score:.3}"));
                }
                if self.state.last_click.is_some() {
                    ui.label(format!("Boxes: {}", self.state.boxes.len()));
                }
                if let Some(number) = self.state.save_number {
                    ui.label(format!("Saved as {number:03}"));
                }

                ui.separator();

                ui.label(&self.state.status);
            });
        });
    }

    fn draw_button_row(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("Button Area").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open Image").clicked() {
                    self.open_image();
                }

                ui.separator();

                ui.label("Results: ");
                for variant in ResultView::iter() {
                    ui.radio_value(&mut self.state.result_view, variant, variant.to_string());
                }
            });
        });
    }

    fn draw_result_row(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("Result Area")
            .resizable(true)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let show_mask = self.state.result_view != ResultView::Boxes;
                    let show_boxes = self.state.result_view != ResultView::Mask;

                    if show_mask {
                        if let Some(mask) = &self.state.mask {
                            let texture = Self::texture(ctx, "mask", mask);
                            ui.image(&texture);
                        }
                    }
                    if show_boxes {
                        if let Some(annotated) = &self.state.annotated {
                            let texture = Self::texture(ctx, "annotated", annotated);
                            ui.image(&texture);
                        }
                    }
                });
            });
    }

    fn draw_img_area(&mut self, ctx: &egui::Context) {
        CentralPanel::default().show(ctx, |ui| match &self.state.img {
            Some(img) => {
                let size = img.size;
                let rgb = img.data.to_rgb8();
                let color =
                    ColorImage::from_rgb([size[0] as usize, size[1] as usize], rgb.as_raw());
                let texture = ctx.load_texture("image", color, TextureOptions::default());

                let response = ui.image(&texture).interact(Sense::click());
                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        let x = (pos.x - response.rect.min.x).max(0.0) as u32;
                        let y = (pos.y - response.rect.min.y).max(0.0) as u32;
                        self.img_clicked([x.min(size[0] - 1), y.min(size[1] - 1)]);
                    }
                }
            }
            None => {
                ui.label(&self.state.status);
            }
        });
    }

    fn texture(ctx: &egui::Context, name: &str, img: &image::RgbImage) -> egui::TextureHandle {
        let size = [img.width() as usize, img.height() as usize];
        let color = ColorImage::from_rgb(size, img.as_raw());
        ctx.load_texture(name, color, TextureOptions::default())
    }
}

// private, backend thread related
impl UiData {
    fn open_image(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("image", &["png", "jpg", "jpeg", "bmp", "webp"])
            .pick_file();

        if let Some(path) = picked {
            self.sender
                .send(Command::LoadImage(path))
                .expect("Failed to send command LoadImage");
            self.state.status = "Embedding image...".to_string();
        }
    }

    fn img_clicked(&mut self, click: [u32; 2]) {
        // no embedding yet, nothing to prompt against
        if !self.state.embedded {
            self.state.status = "Load an image first".to_string();
            return;
        }

        self.sender
            .send(Command::Click(click))
            .expect("Failed to send command Click");
        self.state.status = "Segmenting...".to_string();
    }
}
