//! ONNX Runtime backend for the `Model` trait.

use std::time::Instant;
use anyhow::Result;
use half::f16;
use ndarray::{Array4, ArrayD};
use ort::{
    execution_providers::{CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider, TensorRTExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    value::{DynValue, Value},
};
use regex::Regex;
use crate::common::InferenceDevice;
use crate::data::{ConfigOrt, CROSS_MARK};
use crate::detection_runners::model::Model;

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    output_name: String,
    model_width: u32,
    model_height: u32,
    fp16: bool,
    names: Option<Vec<String>>,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        if !config.ort_lib_path.is_empty() {
            match ort::init_from(&config.ort_lib_path).commit() {
                Ok(_) => {}
                Err(e) => anyhow::bail!("Failed to commit ORT: {:?}", e),
            };
        }

        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::TensorRT(device_id) => {
                Self::build_trt(&mut builder, device_id, config).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => anyhow::bail!("{CROSS_MARK} Model {} declares no outputs", config.onnx_path),
        };

        // Class names: user-defined.or(parsed)
        let names = config.names.clone().or_else(|| Self::fetch_names(&session));

        log::info!(
            "Backend: ONNXRuntime | Model: {} | Device: {} | Input: {}x{} | Scale: {:?} | Classes: {}",
            config.onnx_path,
            device,
            config.model_width,
            config.model_height,
            config.scale.map(|s| s.name()),
            names.as_ref().map_or(0, |n| n.len()),
        );

        Ok(Self {
            session,
            output_name,
            model_width: config.model_width,
            model_height: config.model_height,
            fp16: config.fp16,
            names,
        })
    }

    fn build_trt(builder: &mut SessionBuilder, device_id: usize, config: &ConfigOrt) -> Result<()> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(config.trt_fp16_enable)
            .with_engine_cache(config.trt_engine_cache_enable)
            .with_engine_cache_path("trt-cache");
        if trt.is_available()? {
            match trt.register(builder) {
                Ok(_) => {}
                Err(err) => anyhow::bail!("{CROSS_MARK} TensorRT initialization failed: {:?}", err),
            }
            log::info!("Initial model serialization with TensorRT may take some time...");
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} TensorRT execution provider not available")
        }
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => {}
                Err(err) => anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err),
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => {}
                Err(err) => anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err),
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn fetch_names(session: &Session) -> Option<Vec<String>> {
        // fetch class names from onnx metadata
        // String format: `{0: 'person', 1: 'bicycle', 2: 'sports ball', ..., 27: "yellow_lady's_slipper"}`
        let names = match session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom("names").unwrap_or_default(),
        }?;
        let re = Regex::new(r#"(['"])([-()\w '"]+)(['"])"#).ok()?;
        let mut names_ = vec![];
        for (_, [_, name, _]) in re.captures_iter(&names).map(|x| x.extract()) {
            names_.push(name.to_string());
        }
        Some(names_)
    }

    fn tensor_preprocess(&self, x: Array4<f32>) -> Result<DynValue> {
        let x = if self.fp16 {
            Value::from_array(x.mapv(f16::from_f32))?.into_dyn()
        } else {
            Value::from_array(x)?.into_dyn()
        };
        Ok(x)
    }
}

impl Model for OrtEngine {
    fn input_size(&self) -> (u32, u32) {
        (self.model_width, self.model_height)
    }

    fn forward(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>> {
        let t_run = Instant::now();
        let xs = [Into::<SessionInputValue<'_>>::into(self.tensor_preprocess(input)?)];
        let outputs = self.session.run(&xs[..])?;

        let y = &outputs[self.output_name.as_str()];
        let y = if self.fp16 {
            y.try_extract_array::<f16>()?.mapv(f16::to_f32)
        } else {
            y.try_extract_array::<f32>()?.to_owned()
        };
        log::trace!("ORT forward pass {:?} -> {:?}", t_run.elapsed(), y.shape());

        Ok(y)
    }

    fn names(&self) -> Option<Vec<String>> {
        self.names.clone()
    }
}
