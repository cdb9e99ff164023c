use clap::Parser;
use image::{ImageBuffer, Rgba};
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use treasure_map::{
    CodecError,
    cli::{Cli, Commands, DecodeArgs, EncodeArgs, PlanArgs},
    handler::{handle_decode, handle_encode, handle_plan},
};

/// 一个辅助函数，用于创建一个带有随机像素的测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 4) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(4))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgba([chunk[0], chunk[1], chunk[2], 255]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

/// 在临时目录中准备 Cat、Dog 与藏宝图文件
fn prepare(dir: &Path, cat: (u32, u32), dog: (u32, u32), treasure: &[u8]) -> (PathBuf, PathBuf, PathBuf) {
    let cat_path = dir.join("cat.png");
    let dog_path = dir.join("dog.png");
    let treasure_path = dir.join("map.txt");

    create_test_image(&cat_path, cat.0, cat.1);
    create_test_image(&dog_path, dog.0, dog.1);
    fs::write(&treasure_path, treasure).expect("Failed to write treasure file.");

    (cat_path, dog_path, treasure_path)
}

fn encode_args(treasure: &Path, cat: &Path, dog: &Path, out_dir: Option<PathBuf>) -> EncodeArgs {
    EncodeArgs {
        treasure: treasure.to_path_buf(),
        cat: cat.to_path_buf(),
        dog: dog.to_path_buf(),
        out_dir,
        force: false,
        level: 6,
    }
}

fn codec_code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<CodecError>()
        .map(CodecError::code)
        .unwrap_or("not a codec error")
}

/// 验证从隐藏到恢复的完整流程
#[test]
fn test_handle_encode_and_decode_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let out_dir = dir.path().join("out");
    let recovered_dir = dir.path().join("recovered");
    fs::create_dir_all(&out_dir)?;
    fs::create_dir_all(&recovered_dir)?;

    let original_text = "This is a treasure map for the handler! 这是一张给处理器的藏宝图！".repeat(50);
    let (cat, dog, treasure) = prepare(dir.path(), (100, 75), (60, 60), original_text.as_bytes());

    // 2. 测试 handle_encode
    handle_encode(encode_args(&treasure, &cat, &dog, Some(out_dir.clone())))?;

    let cat_out = out_dir.join("c_cat.png");
    let dog_out = out_dir.join("d_dog.png");
    assert!(cat_out.exists(), "Cat image should be created.");
    assert!(dog_out.exists(), "Dog image should be created.");

    // 4:3 的 Cat 选择 qVGA，两张载体尺寸一致
    assert_eq!(image::image_dimensions(&cat_out)?, (320, 240));
    assert_eq!(image::image_dimensions(&dog_out)?, (320, 240));

    // 3. 测试 handle_decode
    handle_decode(DecodeArgs {
        first: cat_out,
        second: dog_out,
        out_dir: Some(recovered_dir.clone()),
        force: false,
    })?;

    // 4. 验证结果
    let recovered_text = fs::read_to_string(recovered_dir.join("map.txt"))?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered treasure map must match the original."
    );

    Ok(())
}

/// 验证不提供输出目录时使用默认路径，且解码不依赖图像顺序
#[test]
fn test_handle_encode_and_decode_with_defaults() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
    let (cat, dog, treasure) = prepare(dir.path(), (64, 36), (50, 80), &original);

    // 2. 测试 handle_encode，不提供输出目录
    handle_encode(encode_args(&treasure, &cat, &dog, None))?;

    let cat_out = dir.path().join("c_cat.png");
    let dog_out = dir.path().join("d_dog.png");
    assert!(cat_out.exists(), "Default cat output should be created at: {:?}", cat_out);
    assert!(dog_out.exists(), "Default dog output should be created at: {:?}", dog_out);
    assert_eq!(image::image_dimensions(&dog_out)?, (640, 360));

    // 3. 恢复到默认目录时，原始 map.txt 已存在，必须拒绝覆盖
    let reversed = |force| DecodeArgs {
        first: dog_out.clone(),
        second: cat_out.clone(),
        out_dir: None,
        force,
    };
    let result = handle_decode(reversed(false));
    assert!(result.is_err(), "Decoding should not overwrite an existing file.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 4. 使用 --force 后成功，内容逐字节一致
    handle_decode(reversed(true))?;
    assert_eq!(fs::read(&treasure)?, original);

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let (cat, dog, treasure) = prepare(dir.path(), (40, 40), (40, 40), b"some treasure");
    let cat_out = dir.path().join("c_cat.png");

    // 2. 场景一：测试覆盖保护
    fs::write(&cat_out, "this is a dummy file to be overwritten")?;

    let result = handle_encode(encode_args(&treasure, &cat, &dog, None));
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let result = handle_encode(EncodeArgs {
        force: true,
        ..encode_args(&treasure, &cat, &dog, None)
    });
    assert!(result.is_ok(), "Execution should succeed with --force when file exists.");

    let overwritten = fs::read(&cat_out)?;
    assert_ne!(overwritten, b"this is a dummy file to be overwritten");
    assert_eq!(image::image_dimensions(&cat_out)?, (256, 256));

    Ok(())
}

/// 验证竖向 Cat 会得到竖向的输出
#[test]
fn test_portrait_cat_keeps_orientation() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let (cat, dog, treasure) = prepare(dir.path(), (30, 40), (40, 30), b"portrait");

    handle_encode(encode_args(&treasure, &cat, &dog, None))?;

    assert_eq!(image::image_dimensions(dir.path().join("c_cat.png"))?, (240, 320));
    assert_eq!(image::image_dimensions(dir.path().join("d_dog.png"))?, (240, 320));

    Ok(())
}

/// 验证同一张图像传入两次时报告配对错误
#[test]
fn test_same_image_twice_is_header_mismatch() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let (cat, dog, treasure) = prepare(dir.path(), (32, 32), (32, 32), b"pairing");
    handle_encode(encode_args(&treasure, &cat, &dog, None))?;

    let cat_out = dir.path().join("c_cat.png");
    let result = handle_decode(DecodeArgs {
        first: cat_out.clone(),
        second: cat_out,
        out_dir: Some(dir.path().join("nowhere")),
        force: false,
    });

    let err = result.expect_err("Decoding the same image twice must fail.");
    assert_eq!(codec_code(&err), "ERR_HEADER_MISMATCH");

    Ok(())
}

/// 验证来自不同会话的两张图像无法通过认证
#[test]
fn test_mixed_sessions_fail_authentication() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let first_dir = dir.path().join("first");
    let second_dir = dir.path().join("second");
    fs::create_dir_all(&first_dir)?;
    fs::create_dir_all(&second_dir)?;

    let (cat, dog, treasure) = prepare(dir.path(), (32, 32), (32, 32), b"session");
    handle_encode(encode_args(&treasure, &cat, &dog, Some(first_dir.clone())))?;
    handle_encode(encode_args(&treasure, &cat, &dog, Some(second_dir.clone())))?;

    let err = handle_decode(DecodeArgs {
        first: first_dir.join("c_cat.png"),
        second: second_dir.join("d_dog.png"),
        out_dir: Some(dir.path().to_path_buf()),
        force: true,
    })
    .expect_err("Carriers from different sessions must not decode.");
    assert_eq!(codec_code(&err), "ERR_CRYPTO");

    Ok(())
}

/// 验证空文件与非图像载体的错误处理
#[test]
fn test_encode_rejects_invalid_inputs() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let (cat, dog, treasure) = prepare(dir.path(), (16, 16), (16, 16), b"");

    let err = handle_encode(encode_args(&treasure, &cat, &dog, None))
        .expect_err("Empty treasure map must be rejected.");
    assert_eq!(codec_code(&err), "ERR_EMPTY_PAYLOAD");

    fs::write(&treasure, b"not empty anymore")?;
    let bogus_cat = dir.path().join("cat.txt");
    fs::write(&bogus_cat, b"I am not an image")?;

    let err = handle_encode(encode_args(&treasure, &bogus_cat, &dog, None))
        .expect_err("Non-image carrier must be rejected.");
    assert_eq!(codec_code(&err), "ERR_UNSUPPORTED_FORMAT");

    Ok(())
}

/// 验证容量估算命令
#[test]
fn test_handle_plan() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let treasure = dir.path().join("plan.bin");
    fs::write(&treasure, vec![7u8; 4096])?;

    handle_plan(PlanArgs {
        treasure: treasure.clone(),
        name: None,
        level: 6,
    })?;
    handle_plan(PlanArgs {
        treasure: treasure.clone(),
        name: Some("renamed.bin".into()),
        level: 0,
    })?;

    let err = handle_plan(PlanArgs {
        treasure,
        name: Some("x".repeat(300)),
        level: 9,
    })
    .expect_err("Overlong filename must be rejected.");
    assert_eq!(codec_code(&err), "ERR_FILENAME_TOO_LONG");

    Ok(())
}

/// 验证宽高比不同的 Dog 会被拉伸到 Cat 的尺寸，编码与解码仍然成功
#[test]
fn test_square_dog_is_stretched_to_standard_cat() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original = b"stretch the dog to fit the cat".repeat(10);
    let (cat, dog, treasure) = prepare(dir.path(), (100, 75), (60, 60), &original);
    let out_dir = dir.path().join("out");
    fs::create_dir_all(&out_dir)?;

    handle_encode(encode_args(&treasure, &cat, &dog, Some(out_dir.clone())))?;

    let cat_out = out_dir.join("c_cat.png");
    let dog_out = out_dir.join("d_dog.png");
    assert_eq!(image::image_dimensions(&cat_out)?, (320, 240));
    assert_eq!(image::image_dimensions(&dog_out)?, (320, 240));

    handle_decode(DecodeArgs {
        first: dog_out,
        second: cat_out,
        out_dir: Some(out_dir.clone()),
        force: false,
    })?;
    assert_eq!(fs::read(out_dir.join("map.txt"))?, original);

    Ok(())
}

/// 验证不同压缩级别编码的图像都能被解码
#[test]
fn test_compression_level_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original = b"level ".repeat(2000);
    let (cat, dog, treasure) = prepare(dir.path(), (48, 48), (48, 48), &original);

    for level in [0, 9] {
        let out_dir = dir.path().join(format!("level{level}"));
        fs::create_dir_all(&out_dir)?;

        handle_encode(EncodeArgs {
            level,
            ..encode_args(&treasure, &cat, &dog, Some(out_dir.clone()))
        })?;
        handle_decode(DecodeArgs {
            first: out_dir.join("c_cat.png"),
            second: out_dir.join("d_dog.png"),
            out_dir: Some(out_dir.clone()),
            force: false,
        })?;
        assert_eq!(fs::read(out_dir.join("map.txt"))?, original);
    }

    Ok(())
}

/// 验证 `--level` 的默认值与取值范围
#[test]
fn test_level_argument_parsing() {
    let parse = |extra: &[&str]| {
        let mut argv = vec!["treasure_map", "encode", "-t", "map.txt", "-c", "cat.png", "-d", "dog.png"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv)
    };

    match parse(&[]).expect("Default level should parse.").command {
        Commands::Encode(args) => assert_eq!(args.level, 6),
        other => panic!("Unexpected command: {:?}", other),
    }
    match parse(&["--level", "0"]).expect("Level 0 should parse.").command {
        Commands::Encode(args) => assert_eq!(args.level, 0),
        other => panic!("Unexpected command: {:?}", other),
    }
    assert!(parse(&["-l", "10"]).is_err(), "Level above 9 must be rejected.");
}
