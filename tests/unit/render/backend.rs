use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::Rgba8;

/// Backend that fails the way a machine without a usable adapter does.
struct BrokenGpu {
    calls: Rc<Cell<u32>>,
}

impl ColorGradeBackend for BrokenGpu {
    fn name(&self) -> &'static str {
        "broken-gpu"
    }

    fn grade(
        &mut self,
        _input: &PixelBuffer,
        _params: &ColorGradeParams,
    ) -> SkyResult<PixelBuffer> {
        self.calls.set(self.calls.get() + 1);
        Err(SkyError::gpu_init("no gpu adapter available"))
    }
}

fn sample() -> PixelBuffer {
    let mut buf = PixelBuffer::filled(4, 4, Rgba8::rgb(10, 10, 10)).unwrap();
    buf.set(1, 1, Rgba8::rgb(240, 240, 240)).unwrap();
    buf
}

#[test]
fn gpu_init_failure_degrades_once() {
    let calls = Rc::new(Cell::new(0));
    let mut stage = ColorGradeStage::new(Box::new(BrokenGpu {
        calls: calls.clone(),
    }));
    let params = ColorGradeParams::default();
    let expected = apply_color_grade(&sample(), &params).unwrap();

    for _ in 0..5 {
        let out = stage.grade(&sample(), &params).unwrap();
        assert_eq!(out, expected);
    }
    assert!(stage.is_degraded());
    assert_eq!(stage.active_backend(), "cpu");
    assert_eq!(calls.get(), 1);
}

#[test]
fn non_gpu_errors_are_propagated() {
    let mut stage = ColorGradeStage::cpu();
    let bad = ColorGradeParams {
        white_threshold: 2.0,
        ..ColorGradeParams::default()
    };
    assert!(matches!(
        stage.grade(&sample(), &bad),
        Err(SkyError::Validation(_))
    ));
    assert!(!stage.is_degraded());
}

#[test]
fn backend_kind_selection() {
    assert_eq!(create_backend(BackendKind::Cpu).unwrap().name(), "cpu");
    let auto = create_backend(BackendKind::Auto).unwrap();
    if cfg!(feature = "gpu") {
        assert_eq!(auto.name(), "gpu");
        assert!(create_backend(BackendKind::Gpu).is_ok());
    } else {
        assert_eq!(auto.name(), "cpu");
        assert!(matches!(
            create_backend(BackendKind::Gpu),
            Err(SkyError::Validation(_))
        ));
    }
}
