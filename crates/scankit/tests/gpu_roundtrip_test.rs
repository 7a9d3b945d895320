//! GPU integration test.
//!
//! Builds a pipeline from the generated WGSL and the host-side binding and
//! vertex tables, then reads a uniform block back from GPU memory. Requires a
//! GPU adapter (real or software fallback); without one the test logs and
//! returns early.

use scankit::*;

const TECHNIQUE: &str = "
@group(0) @binding(2) var<uniform> depth_overlay_uniforms: DepthOverlayUniforms;

@vertex
fn vs_main(input: QuadVertex) -> TexVertexOut {
    var out: TexVertexOut;
    out.position = depth_overlay_uniforms.projection * vec4<f32>(input.position, 1.0);
    out.tex_coord = input.tex_coord;
    return out;
}

@fragment
fn fs_main(input: TexVertexOut) -> @location(0) vec4<f32> {
    let range = depth_overlay_uniforms.depth_max - depth_overlay_uniforms.depth_min;
    let depth = depth_overlay_uniforms.depth_min + range * input.tex_coord.x;
    let width = f32(depth_overlay_uniforms.camera_intrinsics.width);
    return vec4<f32>(depth / range, input.position.x / width, 0.0, depth_overlay_uniforms.alpha);
}
";

fn request_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("scankit test device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .ok()
    })
}

fn overlay_block() -> DepthOverlayUniforms {
    let camera = CameraIntrinsics::new(640, 480, 500.0, 500.0, 320.0, 240.0);
    DepthOverlayUniforms::new(
        Mat4::IDENTITY,
        Mat4::IDENTITY,
        GpuIntrinsics::from(&camera),
        cube_model_inv(Vec3::splat(1000.0)),
        100.0,
        5000.0,
        0.8,
    )
}

fn read_back(device: &wgpu::Device, queue: &wgpu::Queue, buffer: &wgpu::Buffer, size: u64) -> Vec<u8> {
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
    queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    let _ = device.poll(wgpu::PollType::wait_indefinitely());
    rx.recv().unwrap().unwrap();
    let bytes = slice.get_mapped_range().to_vec();
    staging.unmap();
    bytes
}

#[test]
fn gpu_roundtrip_tests() {
    let Some((device, queue)) = request_device() else {
        eprintln!("Skipping GPU tests: no adapter available");
        return;
    };

    // --- Pipeline built from the generated declarations ---
    {
        let source = format!("{}{TECHNIQUE}", WgslGenerator::default().generate());
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("depth overlay"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let binding = UniformBinding::new(
            &device,
            &overlay_block(),
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            "depth overlay uniforms",
        );
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("depth overlay layout"),
            bind_group_layouts: &[&binding.bind_group_layout],
            push_constant_ranges: &[],
        });
        let _pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("depth overlay pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        let error = pollster::block_on(device.pop_error_scope());
        assert!(error.is_none(), "pipeline creation failed: {error:?}");
    }

    // --- Split vertex buffers, one per attribute slot ---
    {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let positions: Vec<[f32; 3]> = quad_vertices(0.0).iter().map(|v| v.position).collect();
        let tex_coords: Vec<[f32; 2]> = quad_vertices(0.0).iter().map(|v| v.tex_coord).collect();
        let position_buffer = create_attribute_buffer(&device, &positions, Some("positions"));
        let tex_buffer = create_attribute_buffer(&device, &tex_coords, Some("tex coords"));
        assert_eq!(position_buffer.size(), 6 * 12);
        assert_eq!(tex_buffer.size(), 6 * 8);
        assert_eq!(QuadVertex::split_buffer_layouts().len(), 2);
        let error = pollster::block_on(device.pop_error_scope());
        assert!(error.is_none(), "buffer creation failed: {error:?}");
    }

    // --- Uniform bytes survive the trip through GPU memory ---
    {
        let block = overlay_block();
        let zeroed: DepthOverlayUniforms = bytemuck::Zeroable::zeroed();
        let buffer = create_uniform_buffer(&device, &zeroed, Some("overlay"));
        update_uniform_buffer(&queue, &buffer, &block);
        let bytes = read_back(&device, &queue, &buffer, DepthOverlayUniforms::LAYOUT.size as u64);
        assert_eq!(bytes, block.as_bytes());
        assert_eq!(DepthOverlayUniforms::from_bytes(&bytes).unwrap(), block);
    }
}
