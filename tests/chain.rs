extern crate crayon_compositor;
extern crate env_logger;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crayon_compositor::prelude::*;

fn new_chain() -> CompositorChain {
    let _ = env_logger::try_init();

    CompositorChain::new(
        Arc::new(FullscreenQuad::default()),
        &CompositorSettings::default(),
    )
}

fn viewport() -> Viewport {
    Viewport::new(Vector2::new(640, 480))
}

fn materials() -> MaterialLibrary {
    let mut materials = MaterialLibrary::new();

    let pass = MaterialPass::new("blur").with_texture_unit("u_Source");
    materials.add(Material::new("Blur").with_technique(MaterialTechnique::new().with_pass(pass)));

    let mut broken = MaterialTechnique::new().with_pass(MaterialPass::new("broken"));
    broken.supported = false;
    materials.add(Material::new("Broken").with_technique(broken));

    materials
}

fn quad(material: &str, id: u32) -> RenderQuadPass {
    RenderQuadPass::new(material).with_identifier(id)
}

/// A technique with `n` local textures, each one cleared by its own target pass.
fn technique(n: usize) -> Technique {
    let mut technique = Technique::new();
    for i in 0..n {
        let name = format!("rt{}", i);
        technique = technique
            .with_texture(TextureDefinition::new(name.clone(), RenderTextureFormat::RGBA8))
            .with_target(TargetPass::new(name).with_pass(Pass::Clear(ClearPass::default())));
    }

    technique
}

fn output(output: TargetPass) -> Arc<Technique> {
    Arc::new(Technique::new().with_output(output))
}

fn assert_links(chain: &CompositorChain) {
    for (i, v) in chain.instances().iter().enumerate() {
        if i == 0 {
            assert_eq!(v.previous(), None);
        } else {
            assert_eq!(v.previous(), Some(i - 1));
        }
    }
}

#[test]
fn links() {
    let mut visitor = HeadlessVisitor::new();
    let mut chain = new_chain();
    assert!(chain.is_empty());

    chain.insert(None, "A", Arc::new(technique(0))).unwrap();
    chain.insert(None, "B", Arc::new(technique(0))).unwrap();
    assert_eq!(chain.insert(Some(1), "C", Arc::new(technique(0))).unwrap(), 1);
    assert_links(&chain);

    let names: Vec<&str> = chain.instances().iter().map(|v| v.compositor()).collect();
    assert_eq!(names, vec!["A", "C", "B"]);

    chain.remove(0, &mut visitor).unwrap();
    assert_links(&chain);
    assert_eq!(chain.position("B"), Some(1));
    assert_eq!(chain.position("A"), None);

    chain.insert(Some(0), "D", Arc::new(technique(0))).unwrap();
    assert_links(&chain);
    assert_eq!(chain.len(), 3);
    assert!(chain.is_dirty());

    match chain.insert(Some(4), "E", Arc::new(technique(0))) {
        Err(Error::OutOfBounds(4)) => {}
        _ => panic!("inserted out of bounds."),
    }

    match chain.remove(3, &mut visitor) {
        Err(Error::OutOfBounds(3)) => {}
        _ => panic!("removed out of bounds."),
    }

    // Ids are never reused.
    let mut ids: Vec<_> = chain.instances().iter().map(|v| v.id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn enable_and_disable() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let materials = materials();

    let mut chain = new_chain();
    chain.insert(None, "Blur", Arc::new(technique(1))).unwrap();
    chain.compile(&viewport, &materials).unwrap();
    assert!(!chain.is_dirty());

    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    assert!(chain.is_dirty());

    {
        let instance = chain.instance(0).unwrap();
        assert!(instance.is_enabled());
        assert_eq!(instance.texture_instance_name("rt0").unwrap(), "Blur/1/rt0");

        let texture = instance.local_texture("rt0").unwrap();
        assert_eq!(visitor.find("Blur/1/rt0"), Some(texture.handle));
        assert_eq!(texture.params.dimensions, Vector2::new(640, 480));
        assert_eq!(visitor.len(), 1);
    }

    chain.set_enabled(0, false, &mut visitor, &viewport).unwrap();
    chain.set_enabled(0, false, &mut visitor, &viewport).unwrap();

    {
        let instance = chain.instance(0).unwrap();
        assert!(!instance.is_enabled());
        assert_eq!(instance.local_textures().count(), 0);
        assert!(visitor.is_empty());

        match instance.texture_instance_name("rt0") {
            Err(Error::LocalTextureNotFound(ref name)) => assert_eq!(name, "rt0"),
            _ => panic!("found texture of disabled instance."),
        }
    }

    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    assert_eq!(visitor.len(), 1);
    assert!(chain.set_enabled(1, true, &mut visitor, &viewport).is_err());

    chain.remove(0, &mut visitor).unwrap();
    assert!(visitor.is_empty());
}

#[test]
fn compile_every_target() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let materials = materials();
    let mut chain = new_chain();

    let counts = [2, 0, 3];
    for (i, &n) in counts.iter().enumerate() {
        let name = format!("C{}", i);
        chain.insert(None, &name, Arc::new(technique(n))).unwrap();
        chain.set_enabled(i, true, &mut visitor, &viewport).unwrap();
    }

    chain.compile(&viewport, &materials).unwrap();
    assert_eq!(chain.operations().len(), 5);
    assert!(chain.output_operation().is_some());
    assert!(chain.warnings().is_empty());

    // Instances in front are compiled first.
    let mut expected = Vec::new();
    for v in chain.instances() {
        for target in &v.technique().targets {
            let texture = v.local_texture(&target.output).unwrap();
            expected.push(RenderTarget::Texture(texture.handle));
        }
    }

    let targets: Vec<RenderTarget> = chain.operations().iter().map(|v| v.target).collect();
    assert_eq!(targets, expected);

    for batch in chain.operations() {
        assert_eq!(batch.operations.len(), 1);
        assert!(!batch.find_visible_objects);
    }

    assert_eq!(chain.output_operation().unwrap().target, RenderTarget::Output);
}

#[test]
fn empty_chain_renders_scene() {
    let viewport = viewport();
    let mut chain = new_chain();
    chain.compile(&viewport, &materials()).unwrap();

    assert!(chain.operations().is_empty());
    let output = chain.output_operation().unwrap();
    assert_eq!(output.operations.len(), 1);
    assert_eq!(output.render_queues.len(), 91);
    assert!(output.render_queues.contains(queues::SKIES_EARLY));
    assert!(output.render_queues.contains(queues::SKIES_LATE));
    assert!(output.find_visible_objects);

    match output.operations[0] {
        (0, Operation::Clear(ref clear)) => {
            assert_eq!(clear.buffers, viewport.clear_buffers);
            assert_eq!(clear.color, viewport.background);
        }
        _ => panic!("the scene is not cleared."),
    }
}

#[test]
fn queue_order() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let mut chain = new_chain();

    let passes = TargetPass::default()
        .with_pass(Pass::RenderScene(RenderScenePass::new(5, 10)))
        .with_pass(Pass::RenderScene(RenderScenePass::new(3, 4)));

    chain.insert(None, "Scenes", output(passes)).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials()).unwrap();

    assert_eq!(chain.warnings().len(), 1);
    match chain.warnings()[0] {
        CompileWarning::QueueOrder {
            requested, current, ..
        } => {
            assert_eq!(requested, 3);
            assert_eq!(current, 11);
        }
        ref other => panic!("unexpected warning: {}", other),
    }

    let output = chain.output_operation().unwrap();
    let queues: Vec<RenderQueueId> = output.render_queues.iter().collect();
    assert_eq!(queues, (3u8..=10).collect::<Vec<RenderQueueId>>());
    assert_eq!(output.current_queue, 5);
    assert!(output.find_visible_objects);
}

#[test]
fn reversed_queue_range() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let mut chain = new_chain();

    // Struct literals skip the ordering of `RenderScenePass::new`, like loaded data does.
    let reversed = RenderScenePass {
        first_queue: 10,
        last_queue: 3,
    };

    let passes = TargetPass::default().with_pass(Pass::RenderScene(reversed));
    chain.insert(None, "Reversed", output(passes)).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials()).unwrap();

    assert_eq!(chain.warnings().len(), 1);
    match chain.warnings()[0] {
        CompileWarning::ReversedQueueRange { first, last, .. } => {
            assert_eq!(first, 10);
            assert_eq!(last, 3);
        }
        ref other => panic!("unexpected warning: {}", other),
    }

    let output = chain.output_operation().unwrap();
    let queues: Vec<RenderQueueId> = output.render_queues.iter().collect();
    assert_eq!(queues, (3u8..=10).collect::<Vec<RenderQueueId>>());
    assert_eq!(output.current_queue, 11);
    assert!(output.find_visible_objects);
}

#[test]
fn merge_previous_output() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let mut chain = new_chain();

    let mut a = TargetPass::default()
        .with_pass(Pass::Clear(ClearPass::default()))
        .with_pass(Pass::RenderScene(RenderScenePass::new(5, 10)));
    a.visibility_mask = 0b1100;
    a.lod_bias = 0.5;

    let mut b = TargetPass::default()
        .with_input(InputMode::Previous)
        .with_pass(Pass::RenderQuad(quad("Blur", 3)));
    b.visibility_mask = 0b1010;
    b.lod_bias = 4.0;

    chain.insert(None, "A", output(a)).unwrap();
    chain.insert(None, "B", output(b)).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    chain.set_enabled(1, true, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials()).unwrap();
    assert!(chain.warnings().is_empty());

    let output = chain.output_operation().unwrap();
    assert_eq!(output.visibility_mask, 0b1000);
    assert_eq!(output.lod_bias, 2.0);
    assert_eq!(output.operations.len(), 2);

    // The output of A goes first.
    match output.operations[0] {
        (0, Operation::Clear(_)) => {}
        _ => panic!("the output of A is not merged first."),
    }

    match output.operations[1] {
        (11, Operation::Quad(ref quad)) => {
            assert_eq!(quad.instance, chain.instance(1).unwrap().id());
            assert_eq!(quad.pass_id, 3);
        }
        _ => panic!("the output of B is not merged last."),
    }
}

#[test]
fn disabled_instance_is_transparent() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let mut chain = new_chain();

    let a = TargetPass::default().with_pass(Pass::Clear(ClearPass::default()));
    let mut b = TargetPass::default()
        .with_input(InputMode::Previous)
        .with_pass(Pass::RenderQuad(quad("Blur", 1)));
    b.visibility_mask = 0b1010;

    chain.insert(None, "A", output(a)).unwrap();
    chain.insert(None, "B", output(b)).unwrap();
    chain.set_enabled(1, true, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials()).unwrap();

    // B falls through A to the original scene.
    let output = chain.output_operation().unwrap();
    assert_eq!(output.visibility_mask, 0b1010);
    assert_eq!(output.render_queues.len(), 91);
    assert_eq!(output.operations.len(), 2);

    match output.operations[1] {
        (96, Operation::Quad(_)) => {}
        _ => panic!("the quad of B is not merged after the scene."),
    }
}

#[test]
fn missing_material() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let mut chain = new_chain();

    let passes = TargetPass::default().with_pass(Pass::RenderQuad(quad("Missing", 1)));
    chain.insert(None, "A", output(passes)).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials()).unwrap();

    assert!(chain.output_operation().unwrap().operations.is_empty());
    assert_eq!(chain.warnings().len(), 1);
    match chain.warnings()[0] {
        CompileWarning::MissingMaterial {
            ref material,
            pass_id,
            ..
        } => {
            assert_eq!(material, "Missing");
            assert_eq!(pass_id, 1);
        }
        ref other => panic!("unexpected warning: {}", other),
    }
}

#[test]
fn soft_failures() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let mut chain = new_chain();

    let passes = TargetPass::default()
        .with_pass(Pass::RenderQuad(quad("Missing", 1)))
        .with_pass(Pass::RenderQuad(quad("Broken", 2)))
        .with_pass(Pass::RenderQuad(quad("Blur", 3).with_input(1, "rt0")))
        .with_pass(Pass::RenderQuad(quad("Blur", 4).with_input(0, "nope")));

    let technique = Technique::new()
        .with_texture(TextureDefinition::new("rt0", RenderTextureFormat::RGBA8))
        .with_output(passes);

    chain.insert(None, "A", Arc::new(technique)).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials()).unwrap();

    let warnings = chain.warnings();
    assert_eq!(warnings.len(), 4);
    assert!(warnings.iter().all(|v| v.compositor() == "A"));

    match warnings[0] {
        CompileWarning::MissingMaterial { pass_id: 1, .. } => {}
        ref other => panic!("unexpected warning: {}", other),
    }

    match warnings[1] {
        CompileWarning::NoSupportedMaterialTechnique { pass_id: 2, .. } => {}
        ref other => panic!("unexpected warning: {}", other),
    }

    match warnings[2] {
        CompileWarning::TextureUnitOutOfBounds { unit: 1, .. } => {}
        ref other => panic!("unexpected warning: {}", other),
    }

    match warnings[3] {
        CompileWarning::UnknownInput {
            pass_id: 4,
            ref input,
            ..
        } => assert_eq!(input, "nope"),
        ref other => panic!("unexpected warning: {}", other),
    }

    // Quads with bad inputs are still drawn.
    assert_eq!(chain.output_operation().unwrap().operations.len(), 2);
}

#[test]
fn private_materials() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let materials = materials();
    let mut chain = new_chain();

    let technique = Technique::new()
        .with_texture(TextureDefinition::new("rt0", RenderTextureFormat::RGBA8))
        .with_target(TargetPass::new("rt0").with_input(InputMode::Previous))
        .with_output(
            TargetPass::default().with_pass(Pass::RenderQuad(quad("Blur", 7).with_input(0, "rt0"))),
        );

    chain.insert(None, "Blur", Arc::new(technique)).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials).unwrap();

    let rt0 = chain.instance(0).unwrap().local_texture("rt0").unwrap().handle;
    {
        let instance = chain.instance(0).unwrap();
        assert_eq!(instance.materials().len(), 1);

        let material = &instance.materials()[0];
        assert_eq!(material.name(), "Blur/1/1/7");
        assert_eq!(material.passes()[0].texture_units[0].render_texture(), Some(rt0));
    }

    // The shared material is untouched.
    let source = materials.material("Blur").unwrap();
    assert_eq!(
        source.techniques()[0].passes[0].texture_units[0].binding,
        TextureBinding::None
    );

    chain.compile(&viewport, &materials).unwrap();
    assert_eq!(chain.generation(), 2);

    let instance = chain.instance(0).unwrap();
    assert_eq!(instance.materials().len(), 1);
    assert_eq!(instance.materials()[0].name(), "Blur/1/2/7");
}

#[test]
fn dispatch() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let materials = materials();

    let settings = CompositorSettings {
        scene_first_queue: 5,
        scene_last_queue: 6,
        ..Default::default()
    };

    let mut chain = CompositorChain::new(Arc::new(FullscreenQuad::default()), &settings);

    let technique = Technique::new()
        .with_texture(TextureDefinition::new("rt0", RenderTextureFormat::RGBA8))
        .with_target(TargetPass::new("rt0").with_input(InputMode::Previous))
        .with_output(
            TargetPass::default().with_pass(Pass::RenderQuad(quad("Blur", 1).with_input(0, "rt0"))),
        );

    chain.insert(None, "Blur", Arc::new(technique)).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    chain.render(&viewport, &materials, &mut visitor).unwrap();
    assert!(!chain.is_dirty());

    let rt0 = chain.instance(0).unwrap().local_texture("rt0").unwrap().handle;
    let calls = visitor.drain_calls();
    assert_eq!(
        calls,
        vec![
            HeadlessCall::Bind(RenderTarget::Texture(rt0)),
            HeadlessCall::UpdateVisibility(0xFFFF_FFFF, 1.0, "Default".to_owned()),
            HeadlessCall::FindVisibleObjects,
            HeadlessCall::Clear(FrameBuffers::color_depth()),
            HeadlessCall::RenderQueue(5),
            HeadlessCall::RenderQueue(6),
            HeadlessCall::Bind(RenderTarget::Output),
            HeadlessCall::UpdateVisibility(0xFFFF_FFFF, 1.0, "Default".to_owned()),
            HeadlessCall::DrawQuad("blur".to_owned(), vec![Some(rt0)]),
        ]
    );
}

#[test]
fn render_once() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let materials = materials();
    let mut chain = new_chain();

    let mut target = TargetPass::new("rt0").with_pass(Pass::Clear(ClearPass::default()));
    target.only_initial = true;

    let technique = Technique::new()
        .with_texture(TextureDefinition::new("rt0", RenderTextureFormat::RGBA8))
        .with_target(target);

    chain.insert(None, "Once", Arc::new(technique)).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();

    chain.render(&viewport, &materials, &mut visitor).unwrap();
    chain.render(&viewport, &materials, &mut visitor).unwrap();

    let count = |calls: &[HeadlessCall], output: bool| {
        calls
            .iter()
            .filter(|v| match **v {
                HeadlessCall::Bind(RenderTarget::Output) => output,
                HeadlessCall::Bind(RenderTarget::Texture(_)) => !output,
                _ => false,
            })
            .count()
    };

    assert_eq!(count(visitor.calls(), false), 1);
    assert_eq!(count(visitor.calls(), true), 2);

    // Compiling again renders it once more.
    chain.mark_dirty();
    chain.render(&viewport, &materials, &mut visitor).unwrap();
    assert_eq!(count(visitor.calls(), false), 2);
}

struct Recorder {
    setups: Arc<AtomicUsize>,
    renders: Arc<AtomicUsize>,
}

impl InstanceListener for Recorder {
    fn on_material_setup(&mut self, pass_id: u32, material: &mut Material) {
        assert_eq!(pass_id, 7);
        self.setups.fetch_add(1, Ordering::SeqCst);

        for pass in material.passes_mut() {
            pass.set_uniform_variable("u_Frame", UniformVariable::I32(0));
        }
    }

    fn on_material_render(&mut self, _: u32, material: &mut Material) {
        let frame = self.renders.fetch_add(1, Ordering::SeqCst) + 1;

        for pass in material.passes_mut() {
            pass.set_uniform_variable("u_Frame", UniformVariable::I32(frame as i32));
        }
    }
}

#[test]
fn listeners() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let materials = materials();
    let mut chain = new_chain();

    let passes = TargetPass::default().with_pass(Pass::RenderQuad(quad("Blur", 7)));
    chain.insert(None, "A", output(passes)).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();

    let setups = Arc::new(AtomicUsize::new(0));
    let renders = Arc::new(AtomicUsize::new(0));
    let handle = chain.instance_mut(0).unwrap().add_listener(Recorder {
        setups: setups.clone(),
        renders: renders.clone(),
    });

    chain.render(&viewport, &materials, &mut visitor).unwrap();
    chain.render(&viewport, &materials, &mut visitor).unwrap();
    assert_eq!(setups.load(Ordering::SeqCst), 1);
    assert_eq!(renders.load(Ordering::SeqCst), 2);

    {
        let material = &chain.instance(0).unwrap().materials()[0];
        assert_eq!(
            material.passes()[0].uniform_variable("u_Frame"),
            Some(UniformVariable::I32(2))
        );
    }

    assert!(chain.instance_mut(0).unwrap().remove_listener(handle));
    chain.render(&viewport, &materials, &mut visitor).unwrap();
    assert_eq!(renders.load(Ordering::SeqCst), 2);
}

#[test]
fn resize() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let mut chain = new_chain();

    chain.insert(None, "A", Arc::new(technique(1))).unwrap();
    chain.insert(None, "B", Arc::new(technique(1))).unwrap();
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials()).unwrap();

    let before = chain.instance(0).unwrap().local_texture("rt0").unwrap().handle;

    let resized = Viewport::new(Vector2::new(1024, 768));
    chain.notify_viewport_resized(&mut visitor, &resized).unwrap();
    assert!(chain.is_dirty());
    assert!(visitor.render_texture(before).is_none());
    assert_eq!(visitor.len(), 1);

    let texture = chain.instance(0).unwrap().local_texture("rt0").unwrap();
    assert_eq!(texture.params.dimensions, Vector2::new(1024, 768));
    assert_eq!(chain.instance(1).unwrap().local_textures().count(), 0);
}

#[test]
fn resource_failure() {
    let mut visitor = HeadlessVisitor::new();
    let viewport = viewport();
    let materials = materials();
    let mut chain = new_chain();

    chain.insert(None, "A", Arc::new(technique(1))).unwrap();

    visitor.set_budget(Some(0));
    match chain.set_enabled(0, true, &mut visitor, &viewport) {
        Err(Error::Backend(_)) => {}
        _ => panic!("video memory is not exhausted."),
    }

    assert!(chain.instance(0).unwrap().is_enabled());
    match chain.compile(&viewport, &materials) {
        Err(Error::LocalTextureNotFound(ref name)) => assert_eq!(name, "rt0"),
        _ => panic!("compiled an instance without textures."),
    }

    chain.set_enabled(0, false, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials).unwrap();

    visitor.set_budget(None);
    chain.set_enabled(0, true, &mut visitor, &viewport).unwrap();
    chain.compile(&viewport, &materials).unwrap();
    assert_eq!(chain.operations().len(), 1);
}
