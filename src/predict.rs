//! Form submission → `POST /predict` → result panel.

use crate::context::DashContext;
use crate::display::{ElementId, Surface};
use crate::error::PredictError;
use crate::health::HealthClass;
use crate::logging::{agg_increment, log_prediction};
use crate::reading::{FormInput, Reading};
use crate::render::{classify_and_render, Panel};

pub const BACKEND_UNREACHABLE: &str = "Failed to get prediction. Ensure the backend server is running.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub reading: Reading,
    pub class: HealthClass,
}

pub struct PredictionRequestHandler {
    ctx: DashContext,
}

impl PredictionRequestHandler {
    pub fn new(ctx: DashContext) -> Self {
        Self { ctx }
    }

    /// Read the four inputs off the surface and submit them.
    pub async fn submit_from_surface(&self) -> Result<Prediction, PredictError> {
        let form = {
            let surface = self.ctx.surface();
            FormInput::new(
                surface.value(ElementId::Voltage),
                surface.value(ElementId::Current),
                surface.value(ElementId::Temperature),
                surface.value(ElementId::Cycle),
            )
        };
        self.submit(&form).await
    }

    pub async fn submit(&self, form: &FormInput) -> Result<Prediction, PredictError> {
        let request = match form.parse() {
            Ok(req) => req,
            Err(err) => {
                log_prediction("invalid_input", None, None, &err.to_string());
                let mut surface = self.ctx.surface();
                surface.alert(&format!("Invalid input: {}", err));
                surface.flush();
                return Err(err.into());
            }
        };

        {
            let mut surface = self.ctx.surface();
            surface.set_hidden(ElementId::ResultContainer, true);
            surface.set_hidden(ElementId::Loading, false);
            surface.flush();
        }

        let outcome = self.ctx.backend.predict(&request).await;

        let mut surface = self.ctx.surface();
        surface.set_hidden(ElementId::Loading, true);
        match outcome {
            Ok(resp) => {
                let reading = request.with_soh(resp.soh);
                let class = classify_and_render(&mut *surface, Panel::Result, &reading);
                surface.set_hidden(ElementId::ResultContainer, false);
                surface.flush();
                agg_increment("prediction");
                log_prediction("ok", Some(resp.soh), Some(class.tier.as_str()), class.message);
                Ok(Prediction { reading, class })
            }
            Err(err) => {
                surface.alert(BACKEND_UNREACHABLE);
                surface.flush();
                agg_increment("prediction_failure");
                log_prediction("request_failed", None, None, &err.to_string());
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, PredictResponse, StatusPayload};
    use crate::config::Config;
    use crate::context::shared;
    use crate::display::{MemorySurface, SharedSurface, StyleProp};
    use crate::error::RequestFailure;
    use crate::health::Tier;
    use crate::reading::PredictRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    struct FixedSoh {
        soh: Option<f64>,
        calls: AtomicU32,
        seen: Mutex<Vec<PredictRequest>>,
    }

    impl FixedSoh {
        fn new(soh: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                soh,
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Backend for FixedSoh {
        async fn predict(&self, req: &PredictRequest) -> Result<PredictResponse, RequestFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(*req);
            match self.soh {
                Some(soh) => Ok(PredictResponse { soh, message: None }),
                None => Err(RequestFailure::Status(500)),
            }
        }

        async fn status(&self) -> Result<StatusPayload, RequestFailure> {
            Err(RequestFailure::Status(404))
        }
    }

    fn setup(backend: Arc<FixedSoh>) -> (PredictionRequestHandler, Arc<Mutex<MemorySurface>>) {
        let mem = shared(MemorySurface::new());
        let surface: SharedSurface = mem.clone();
        let ctx = DashContext::new(backend, surface, Config::default());
        (PredictionRequestHandler::new(ctx), mem)
    }

    #[tokio::test]
    async fn test_success_renders_result_panel() {
        let backend = FixedSoh::new(Some(82.3));
        let (handler, mem) = setup(backend.clone());
        let p = handler
            .submit(&FormInput::new("3.7", "-1.2", "25.0", "50"))
            .await
            .unwrap();
        assert_eq!(p.class.tier, Tier::Good);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        let s = mem.lock().unwrap();
        assert_eq!(s.text(ElementId::SohValue), "82.3");
        assert_eq!(s.text(ElementId::HealthMessage), "Battery is in Good Condition");
        assert_eq!(s.style(ElementId::ProgressBar, StyleProp::Width).as_deref(), Some("82.3%"));
        assert!(!s.is_hidden(ElementId::ResultContainer));
        assert!(s.is_hidden(ElementId::Loading));
        assert!(s.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_failure_alerts_and_keeps_panel_hidden() {
        let (handler, mem) = setup(FixedSoh::new(None));
        let err = handler
            .submit(&FormInput::new("3.7", "-1.2", "25.0", "50"))
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::Request(RequestFailure::Status(500))));

        let s = mem.lock().unwrap();
        assert!(s.is_hidden(ElementId::ResultContainer));
        assert!(s.is_hidden(ElementId::Loading));
        assert_eq!(s.alerts(), [BACKEND_UNREACHABLE.to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_backend() {
        let backend = FixedSoh::new(Some(90.0));
        let (handler, mem) = setup(backend.clone());
        let err = handler
            .submit(&FormInput::new("3.7", "", "25.0", "50"))
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::Input(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

        let s = mem.lock().unwrap();
        assert_eq!(s.alerts().len(), 1);
        assert!(s.alerts()[0].contains("current"));
        assert!(s.is_hidden(ElementId::Loading));
    }

    #[tokio::test]
    async fn test_failed_resubmit_hides_previous_result() {
        let (ok_handler, mem) = setup(FixedSoh::new(Some(55.0)));
        ok_handler
            .submit(&FormInput::new("3.1", "-1.9", "33.0", "180"))
            .await
            .unwrap();
        assert!(!mem.lock().unwrap().is_hidden(ElementId::ResultContainer));

        let surface: SharedSurface = mem.clone();
        let failing = PredictionRequestHandler::new(DashContext::new(
            FixedSoh::new(None),
            surface,
            Config::default(),
        ));
        assert!(failing
            .submit(&FormInput::new("3.1", "-1.9", "33.0", "180"))
            .await
            .is_err());
        assert!(mem.lock().unwrap().is_hidden(ElementId::ResultContainer));
    }

    #[tokio::test]
    async fn test_submit_from_surface_reads_inputs() {
        let backend = FixedSoh::new(Some(65.0));
        let (handler, mem) = setup(backend.clone());
        {
            let mut s = mem.lock().unwrap();
            s.set_value(ElementId::Voltage, "3.9");
            s.set_value(ElementId::Current, "-0.8");
            s.set_value(ElementId::Temperature, "30");
            s.set_value(ElementId::Cycle, "12");
        }
        let p = handler.submit_from_surface().await.unwrap();
        assert_eq!(p.class.tier, Tier::Degraded);
        let seen = backend.seen.lock().unwrap();
        assert_eq!(
            seen[..],
            [PredictRequest {
                voltage: 3.9,
                current: -0.8,
                temperature: 30.0,
                cycle: 12,
            }]
        );
    }
}
